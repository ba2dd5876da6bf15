//! Persistence layer for bookshelf
//!
//! Provides:
//! - Book record types
//! - The `BookStore` trait
//! - A SQLite implementation backed by a single database file

mod book;
mod sqlite;
mod traits;

pub use book::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
