use std::path::Path;

use anyhow::anyhow;
use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

/// Opens the configured database and makes sure every table exists
pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        let path = config.path.as_ref().ok_or_else(|| {
            StorageError::Internal(anyhow!("database.path is required unless in_memory = true"))
        })?;
        log::debug!("opening database {}", path.to_string_lossy());
        open_from_file(path)?
    };
    schema::init(&db)?;
    Ok(db)
}
