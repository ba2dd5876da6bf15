//! Book record types

use bookshelf_util::BookId;
use std::fmt;

use crate::{StoreError, StoreResult};

/// A stored book record
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub price: Option<f64>,
}

/// A book record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub price: Option<f64>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: None,
            price: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Title and author are required and must not be blank. A price, if
    /// present, must be finite.
    pub fn validate(&self) -> StoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(StoreError::InvalidRecord("title cannot be empty".into()));
        }
        if self.author.trim().is_empty() {
            return Err(StoreError::InvalidRecord("author cannot be empty".into()));
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

/// Reject NaN and infinities. SQLite stores NaN as NULL and the CSV
/// importer refuses both, so neither can be written.
pub fn validate_price(price: f64) -> StoreResult<()> {
    if !price.is_finite() {
        return Err(StoreError::InvalidRecord(format!(
            "price must be a finite number, got {}",
            price
        )));
    }
    Ok(())
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} by {}", self.id, self.title, self.author)?;
        if let Some(year) = self.year {
            write!(f, " ({})", year)?;
        }
        if let Some(price) = self.price {
            write!(f, " - {:.2}", price)?;
        }
        Ok(())
    }
}
