//! Error types for the catalog client.

use encore_core::CoreError;
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog answered with a non-success status
    #[error("Catalog error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Catalog answered with an error document
    #[error("Catalog API error {code} ({kind}): {message}")]
    Api {
        kind: String,
        message: String,
        code: i64,
    },

    /// The requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse catalog response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Response parsed but does not describe a valid entity
    #[error("Invalid catalog data: {0}")]
    InvalidData(#[from] CoreError),

    /// Catalog is offline or unreachable
    #[error("Catalog unreachable: {0}")]
    Unreachable(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
