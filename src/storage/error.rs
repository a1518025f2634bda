use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("album {0} not found")]
    AlbumNotFound(i64),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
