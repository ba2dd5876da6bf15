//! Error types for bookshelf

use thiserror::Error;

/// Errors raised while reading user input
#[derive(Debug, Error)]
pub enum BookshelfError {
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("End of input")]
    EndOfInput,
}

impl BookshelfError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}
