//! Shared utilities for bookshelf
//!
//! This crate provides:
//! - ID types (BookId)
//! - Clock helpers and the backup timestamp format
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
