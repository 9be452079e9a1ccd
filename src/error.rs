use std::path::PathBuf;

/// Errors raised by catalog operations (store access, lookup, ingestion).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Drama not found: {id}")]
    NotFound { id: i64 },

    #[error("CSV file {} not found", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. } | CatalogError::SourceNotFound(_))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
