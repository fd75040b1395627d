//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`SentimentError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`SentimentError`] as the error type.
pub type Result<T> = std::result::Result<T, SentimentError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust,no_run
/// use candle_sentiment::error::SentimentError;
///
/// fn handle_error(e: SentimentError) {
///     match &e {
///         SentimentError::InvalidInput(_) => {
///             // Caller passed empty or blank text - fix the input
///         }
///         SentimentError::Download(_) => {
///             // Network issue - retry with backoff
///         }
///         SentimentError::Device(_) => {
///             // GPU unavailable - fall back to CPU
///         }
///         SentimentError::Tokenization(_) => {
///             // Bad input - fix and retry
///         }
///         SentimentError::Unexpected(_) => {
///             // Internal error - report bug
///             eprintln!("Internal error: {e}");
///         }
///         _ => {
///             // Future error variants
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentimentError {
    /// Input failed validation. Never retried; fix the input.
    #[error("{0}")]
    InvalidInput(String),

    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenization failure. Check input text.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Model forward pass failure.
    #[error("{0}")]
    Inference(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for SentimentError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        SentimentError::Download(format!("HuggingFace API error: {value}"))
    }
}

impl From<candle_core::Error> for SentimentError {
    fn from(value: candle_core::Error) -> Self {
        SentimentError::Inference(value.to_string())
    }
}

impl From<std::io::Error> for SentimentError {
    fn from(value: std::io::Error) -> Self {
        SentimentError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for SentimentError {
    fn from(value: serde_json::Error) -> Self {
        SentimentError::Unexpected(value.to_string())
    }
}
