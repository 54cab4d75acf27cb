//! Error classification for retry and fallback decisions

use super::types::ChorusError;

impl ChorusError {
    /// Check if re-attempting the same operation may succeed.
    ///
    /// Rate limits, server-side failures, and timeouts are transient.
    /// Authentication and context-length errors reflect the request itself
    /// and will reproduce on every attempt. Unclassified errors are
    /// non-retryable unless the provider mapping marked them otherwise.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } | Self::Server { .. } | Self::Timeout { .. } => true,
            Self::Unknown { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// The vendor-supplied retry hint in seconds, if any
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimit {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }

    /// The provider this error originated from, if any
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Auth { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::ContextLength { provider, .. }
            | Self::Server { provider, .. }
            | Self::Unknown { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// The HTTP status code that produced this error, if one was recorded
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Stable code for programmatic error identification
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "AUTH",
            Self::RateLimit { .. } => "RATE_LIMIT",
            Self::ContextLength { .. } => "CONTEXT_LENGTH",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Config { .. } => "CONFIG",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Json { .. } => "JSON",
            Self::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            Self::AllProvidersFailed { .. } => "ALL_PROVIDERS_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown { .. } => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChorusError;

    #[test]
    fn auth_and_context_length_are_never_retryable() {
        assert!(!ChorusError::auth("bad key", "openai").is_retryable());
        assert!(!ChorusError::context_length("too long", "anthropic").is_retryable());
    }

    #[test]
    fn rate_limit_and_server_are_retryable() {
        assert!(ChorusError::rate_limit("slow down", "openai", Some(30)).is_retryable());
        assert!(ChorusError::server("boom", "google", Some(503)).is_retryable());
    }

    #[test]
    fn unknown_defaults_to_the_explicit_flag() {
        assert!(!ChorusError::unknown("weird", "openai", false).is_retryable());
        assert!(ChorusError::unknown("conn reset", "openai", true).is_retryable());
    }

    #[test]
    fn retry_after_only_set_for_rate_limits() {
        assert_eq!(
            ChorusError::rate_limit("slow down", "openai", Some(60)).retry_after(),
            Some(60)
        );
        assert_eq!(ChorusError::server("boom", "openai", None).retry_after(), None);
    }

    #[test]
    fn exhaustion_error_code() {
        let err = ChorusError::all_providers_failed("nothing configured");
        assert_eq!(err.error_code(), "ALL_PROVIDERS_FAILED");
        assert!(!err.is_retryable());
    }
}
