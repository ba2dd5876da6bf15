//! Core catalog logic for bookshelf
//!
//! This crate implements:
//! - Timestamped snapshots of the live database file
//! - The retention policy that prunes old snapshots
//! - The mutation guard (no mutation without a prior snapshot)
//! - CSV interchange
//! - Catalog operations on top of a `BookStore`

mod catalog;
mod guard;
mod interchange;
mod retention;
mod snapshot;

pub use catalog::*;
pub use guard::*;
pub use interchange::*;
pub use retention::*;
pub use snapshot::*;
