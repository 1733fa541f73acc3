/*!
 * Error types for the transloom pipeline.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a provider response fails
    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    /// Error related to rate limiting or quota exhaustion
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication; retrying will not help
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Transient error that may succeed on a later attempt
    #[error("Transient provider error: {0}")]
    Transient(String),
}

impl ProviderError {
    /// Whether this error aborts the whole run rather than one language.
    ///
    /// Authentication failures are not recoverable by moving on to the next
    /// language, so the controller fails the run when it sees one.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::AuthenticationError(_))
    }
}

/// Errors that can occur while extracting segments from a document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document does not have the structure extraction expects
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

/// Errors that can occur in the review import/export round trip
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The review table could not be read or written
    #[error("Review table I/O error: {0}")]
    Table(String),

    /// The review table is missing one of its required columns
    #[error("Review table missing column: {0}")]
    MissingColumn(String),

    /// The review artifact could not be serialized or deserialized
    #[error("Review artifact error: {0}")]
    Artifact(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from the review round trip
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
