use std::path::{Component, Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::fs;

use super::catalog_seed::has_image_extension;
use crate::error::{CatalogError, CatalogResult};

/// Characters escaped inside the path part of an image URL; `/` is kept so
/// nested files stay addressable.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Image bytes with the content type detected from them.
#[derive(Debug)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Flat directory of puzzle images served under `/api/images/`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an uploaded image, replacing any file of the same name.
    ///
    /// The name must be a bare file name with an image extension, and the
    /// content must look like an image.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> CatalogResult<String> {
        let name = sanitize_filename(filename)?;
        if !infer::is_image(bytes) {
            return Err(CatalogError::validation(format!(
                "{} does not contain image data",
                name
            )));
        }

        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(&name), bytes).await?;

        tracing::info!("Stored image {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    pub async fn exists(&self, filename: &str) -> bool {
        match self.resolve(filename) {
            Some(path) => fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Best-effort removal of a stored file; failures are only logged.
    pub async fn remove(&self, filename: &str) {
        let Ok(name) = sanitize_filename(filename) else {
            return;
        };
        match fs::remove_file(self.root.join(&name)).await {
            Ok(()) => tracing::info!("Removed image {}", name),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("Failed to remove image {}: {}", name, err),
        }
    }

    /// Reads an image by its path relative to the root.
    ///
    /// `None` for missing files and for paths that would leave the root.
    pub async fn read(&self, relative: &str) -> CatalogResult<Option<StoredImage>> {
        let Some(path) = self.resolve(relative) else {
            tracing::warn!("Rejected image path outside the image root: {}", relative);
            return Ok(None);
        };

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::IsADirectory => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or_else(|| content_type_for_extension(&path));

        Ok(Some(StoredImage {
            bytes,
            content_type,
        }))
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let candidate = Path::new(relative);
        let mut resolved = self.root.clone();
        let mut depth = 0;
        for component in candidate.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        (depth > 0).then_some(resolved)
    }
}

/// Absolute URL under which the image at `file_path` is served.
pub fn image_url(base_url: &str, file_path: &str) -> String {
    format!(
        "{}/api/images/{}",
        base_url.trim_end_matches('/'),
        utf8_percent_encode(file_path, PATH_SEGMENT)
    )
}

/// Accepts a bare image file name; anything carrying directory parts is rejected.
pub fn sanitize_filename(filename: &str) -> CatalogResult<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation("No file selected"));
    }

    let mut components = Path::new(trimmed).components();
    let name = match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name.to_str(),
        _ => None,
    };
    let Some(name) = name.filter(|n| !n.starts_with('.') && !n.contains('\\')) else {
        return Err(CatalogError::validation(format!(
            "Invalid file name: {}",
            trimmed
        )));
    };

    if !has_image_extension(name) {
        return Err(CatalogError::validation(
            "Only jpg, jpeg, png and gif images are accepted",
        ));
    }

    Ok(name.to_string())
}

fn content_type_for_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
