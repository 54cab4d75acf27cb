//! Core error types for the Chorus engine

use thiserror::Error;

/// Result type alias for Chorus operations
pub type ChorusResult<T> = Result<T, ChorusError>;

/// Unified error type for the completion routing engine.
///
/// Every provider adapter maps its vendor-specific failure shapes into this
/// taxonomy; the rest of the engine only ever inspects these variants. The
/// retry policy and the registry decide what to do with an error purely
/// through [`ChorusError::is_retryable`] and [`ChorusError::retry_after`].
#[derive(Error, Debug, Clone)]
pub enum ChorusError {
    /// Credentials rejected (401/403-equivalent). Never retryable.
    #[error("authentication rejected by {provider}: {message}")]
    Auth { message: String, provider: String },

    /// Rate limited (429-equivalent). Retryable; may carry the vendor's
    /// `retry-after` hint in seconds.
    #[error("rate limited by {provider}: {message}")]
    RateLimit {
        message: String,
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// The request exceeds the model's context window. Never retryable.
    #[error("context window exceeded on {provider}: {message}")]
    ContextLength { message: String, provider: String },

    /// Server-side failure (5xx-equivalent). Retryable.
    #[error("server error from {provider}: {message}")]
    Server {
        message: String,
        provider: String,
        status_code: Option<u16>,
    },

    /// Configuration related errors
    #[error("configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Invalid input errors (e.g. an empty message sequence)
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// An operation or stream exceeded its time bound
    #[error("timed out after {seconds} seconds")]
    Timeout {
        seconds: u64,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Structured output could not be extracted or validated
    #[error("failed to generate valid {what}: {message}")]
    ExtractionFailed { what: String, message: String },

    /// Every configured provider was skipped or none was attempted
    #[error("all providers failed: {message}")]
    AllProvidersFailed { message: String },

    /// The operation was cancelled
    #[error("operation was cancelled")]
    Cancelled,

    /// Anything the provider mapping could not classify. Non-retryable by
    /// default; the adapter must opt in explicitly for transient transport
    /// failures.
    #[error("{provider} error: {message}")]
    Unknown {
        message: String,
        provider: String,
        retryable: bool,
    },
}
