use serde::Deserialize;
use std::{env, path::PathBuf};

const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub images_dir: PathBuf,
    /// Public origin used to build absolute image URLs.
    pub base_url: String,
    /// Allowed CORS origins; empty means any origin.
    pub cors_origins: Vec<String>,
    pub upload_max_bytes: usize,
    pub otlp_endpoint: Option<String>,
    /// Emit log lines as JSON objects instead of human-readable text.
    pub log_json: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let database_path = settings
            .get_string("database.path")
            .or_else(|_| env::var("DATABASE_PATH"))
            .unwrap_or_else(|_| "data/database/spelling_bee.db".to_string());

        let images_dir = settings
            .get_string("storage.images_dir")
            .or_else(|_| env::var("IMAGES_FOLDER"))
            .unwrap_or_else(|_| "data/images".to_string());

        let base_url = settings
            .get_string("server.base_url")
            .or_else(|_| env::var("BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let base_url = normalize_base_url(&base_url)?;

        let cors_origins = settings
            .get_string("server.cors_origins")
            .or_else(|_| env::var("CORS_ORIGINS"))
            .map(|raw| parse_origin_list(&raw))
            .unwrap_or_default();

        let upload_max_bytes = settings
            .get_string("upload.max_bytes")
            .or_else(|_| env::var("UPLOAD_MAX_BYTES"))
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES);

        let otlp_endpoint = settings
            .get_string("telemetry.otlp_endpoint")
            .or_else(|_| env::var("OTEL_EXPORTER_OTLP_ENDPOINT"))
            .ok()
            .filter(|value| !value.trim().is_empty());

        let log_json = settings
            .get_string("logging.json")
            .or_else(|_| env::var("LOG_JSON"))
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);

        Ok(Config {
            bind_addr,
            database_path: PathBuf::from(database_path),
            images_dir: PathBuf::from(images_dir),
            base_url,
            cors_origins,
            upload_max_bytes,
            otlp_endpoint,
            log_json,
        })
    }

    /// Configuration rooted in a scratch directory, used by tests and tooling.
    pub fn for_directory(root: &std::path::Path) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            database_path: root.join("spelling_bee.db"),
            images_dir: root.join("images"),
            base_url: "http://localhost:5000".to_string(),
            cors_origins: Vec::new(),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            otlp_endpoint: None,
            log_json: false,
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, config::ConfigError> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| config::ConfigError::Message(format!("Invalid BASE_URL {}: {}", raw, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(config::ConfigError::Message(format!(
            "BASE_URL must use http or https, got {}",
            parsed.scheme()
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
