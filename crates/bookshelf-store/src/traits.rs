//! Store trait definitions

use bookshelf_util::BookId;

use crate::{Book, NewBook, StoreResult};

/// Book record store
pub trait BookStore: Send + Sync {
    /// Insert a record and return the id the store assigned
    fn insert_book(&self, book: &NewBook) -> StoreResult<BookId>;

    /// Get a single record
    fn get_book(&self, id: BookId) -> StoreResult<Option<Book>>;

    /// All records ordered by id
    fn list_books(&self) -> StoreResult<Vec<Book>>;

    /// Records whose author matches exactly
    fn find_by_author(&self, author: &str) -> StoreResult<Vec<Book>>;

    /// Set the price of a record. Returns false if no such record exists.
    /// Non-finite prices are rejected with `StoreError::InvalidRecord`.
    fn update_price(&self, id: BookId, price: f64) -> StoreResult<bool>;

    /// Delete a record. Returns false if no such record exists.
    fn delete_book(&self, id: BookId) -> StoreResult<bool>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
