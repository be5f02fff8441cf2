use thiserror::Error;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Failures raised by the catalog, selector and progress services.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Requested puzzle or combo does not exist
    #[error("{0}")]
    NotFound(String),

    /// Database failure; the surrounding transaction has been rolled back
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Filesystem failure in the asset directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }

    /// SQLite reports lock contention as SQLITE_BUSY (5) or SQLITE_LOCKED (6).
    pub fn is_busy(&self) -> bool {
        match self {
            CatalogError::Storage(sqlx::Error::Database(db_err)) => {
                matches!(db_err.code().as_deref(), Some("5") | Some("6"))
                    || db_err.message().contains("database is locked")
            }
            _ => false,
        }
    }
}
