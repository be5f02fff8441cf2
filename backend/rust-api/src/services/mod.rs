use crate::config::Config;
use sqlx::SqlitePool;

use self::catalog_store::CatalogStore;
use self::image_store::ImageStore;

pub struct AppState {
    pub config: Config,
    pub store: CatalogStore,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let images = ImageStore::new(config.images_dir.clone());
        tracing::info!(
            "Serving images from {} as {}/api/images/",
            images.root().display(),
            config.base_url
        );

        Self {
            config,
            store: CatalogStore::new(pool),
            images,
        }
    }
}

pub mod admin_service;
pub mod answer_service;
pub mod catalog_seed;
pub mod catalog_store;
pub mod image_store;
pub mod progress_tracker;
pub mod puzzle_renderer;
pub mod puzzle_selector;
