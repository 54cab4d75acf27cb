//! Constructor methods for ChorusError

use super::types::ChorusError;

impl ChorusError {
    /// Create an authentication error
    pub fn auth(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            provider: provider.into(),
        }
    }

    /// Create a rate-limit error, optionally carrying the vendor retry hint
    pub fn rate_limit(
        message: impl Into<String>,
        provider: impl Into<String>,
        retry_after_secs: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            message: message.into(),
            provider: provider.into(),
            retry_after_secs,
        }
    }

    /// Create a context-length error
    pub fn context_length(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::ContextLength {
            message: message.into(),
            provider: provider.into(),
        }
    }

    /// Create a server error
    pub fn server(
        message: impl Into<String>,
        provider: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Server {
            message: message.into(),
            provider: provider.into(),
            status_code,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new timeout error
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout {
            seconds,
            context: None,
        }
    }

    /// Create a timeout error with context
    pub fn timeout_with_context(seconds: u64, context: impl Into<String>) -> Self {
        Self::Timeout {
            seconds,
            context: Some(context.into()),
        }
    }

    /// Create a JSON error with message
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create a JSON error with context
    pub fn json_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a structured-output extraction error
    pub fn extraction_failed(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a provider-exhaustion error
    pub fn all_providers_failed(message: impl Into<String>) -> Self {
        Self::AllProvidersFailed {
            message: message.into(),
        }
    }

    /// Create an unclassified provider error
    pub fn unknown(
        message: impl Into<String>,
        provider: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self::Unknown {
            message: message.into(),
            provider: provider.into(),
            retryable,
        }
    }
}
