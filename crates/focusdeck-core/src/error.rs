//! Error types for focusdeck-core.

use thiserror::Error;

/// Errors surfaced by the stores and the assistant client.
#[derive(Error, Debug)]
pub enum CoreError {
    /// User input rejected before it reached a store
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Transport or decoding failure talking to the completion endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion endpoint answered, but not with something usable
    #[error("Assistant error: {0}")]
    Assistant(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
