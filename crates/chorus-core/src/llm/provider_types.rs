//! Provider identifiers and timeout configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Supported completion providers.
///
/// The set is fixed at compile time; configuration only decides which of
/// these are active for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI (GPT models)
    OpenAi,
    /// Anthropic (Claude models)
    Anthropic,
    /// Google (Gemini models)
    Google,
}

impl ProviderKind {
    /// Global preference order used to compute fallback sequences.
    pub const PREFERENCE_ORDER: [ProviderKind; 3] =
        [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Google];

    /// Get the provider name as a string
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }

    /// Environment variable prefix for this provider's configuration triplet
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Anthropic => "ANTHROPIC",
            ProviderKind::Google => "GOOGLE",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "google" | "gemini" => Ok(ProviderKind::Google),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Timeout configuration for completion requests.
///
/// - **Connection timeout**: time allowed to establish a connection
/// - **Request timeout**: end-to-end bound for a non-streaming call
/// - **Stream idle timeout**: maximum silence between stream chunks
/// - **Stream max duration**: hard wall-clock bound on a stream's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in seconds. Default: 30
    #[serde(default = "TimeoutConfig::default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Request timeout in seconds for non-streaming calls. Default: 60
    #[serde(default = "TimeoutConfig::default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Idle window between successive stream chunks in seconds. Default: 30
    #[serde(default = "TimeoutConfig::default_stream_idle_timeout")]
    pub stream_idle_timeout_secs: u64,

    /// Total stream lifetime bound in seconds. Default: 120
    #[serde(default = "TimeoutConfig::default_stream_max_duration")]
    pub stream_max_duration_secs: u64,
}

impl TimeoutConfig {
    const fn default_connection_timeout() -> u64 {
        30
    }

    const fn default_request_timeout() -> u64 {
        60
    }

    const fn default_stream_idle_timeout() -> u64 {
        30
    }

    const fn default_stream_max_duration() -> u64 {
        120
    }

    /// Create a new timeout configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connection timeout in seconds
    pub fn with_connection_timeout_secs(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Set request timeout in seconds
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the stream idle window in seconds
    pub fn with_stream_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.stream_idle_timeout_secs = secs;
        self
    }

    /// Set the stream lifetime bound in seconds
    pub fn with_stream_max_duration_secs(mut self, secs: u64) -> Self {
        self.stream_max_duration_secs = secs;
        self
    }

    /// Get connection timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the stream idle window as Duration
    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }

    /// Get the stream lifetime bound as Duration
    pub fn stream_max_duration(&self) -> Duration {
        Duration::from_secs(self.stream_max_duration_secs)
    }

    /// Validate timeout configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connection_timeout_secs == 0 {
            return Err("connection timeout must be greater than 0".to_string());
        }
        if self.request_timeout_secs < self.connection_timeout_secs {
            return Err(
                "request timeout must be greater than or equal to connection timeout".to_string(),
            );
        }
        if self.stream_idle_timeout_secs == 0 || self.stream_max_duration_secs == 0 {
            return Err("stream timeouts must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: Self::default_connection_timeout(),
            request_timeout_secs: Self::default_request_timeout(),
            stream_idle_timeout_secs: Self::default_stream_idle_timeout(),
            stream_max_duration_secs: Self::default_stream_max_duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_names() {
        for kind in ProviderKind::PREFERENCE_ORDER {
            assert_eq!(ProviderKind::from_str(kind.name()), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(ProviderKind::from_str("mistral").is_err());
    }

    #[test]
    fn validate_rejects_inverted_timeouts() {
        let config = TimeoutConfig::new()
            .with_connection_timeout_secs(60)
            .with_request_timeout_secs(10);
        assert!(config.validate().is_err());
        assert!(TimeoutConfig::default().validate().is_ok());
    }
}
