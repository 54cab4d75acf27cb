//! Per-provider configuration

use crate::llm::provider_types::TimeoutConfig;
use serde::{Deserialize, Serialize};

/// Configuration for one completion provider.
///
/// Owned exclusively by its provider instance once the registry is built;
/// nothing mutates it after construction.
///
/// # Examples
///
/// ```rust
/// use chorus_core::config::ProviderConfig;
///
/// let config = ProviderConfig::new()
///     .with_api_key("sk-xxx")
///     .with_base_url("https://api.openai.com/v1")
///     .with_max_retries(5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for authentication
    pub api_key: Option<String>,
    /// API endpoint base URL (overrides the provider default)
    pub base_url: Option<String>,
    /// Default model name (overrides the provider built-in)
    pub default_model: Option<String>,
    /// Timeout configuration
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Maximum number of retries for failed requests
    #[serde(default = "ProviderConfig::default_max_retries")]
    pub max_retries: u32,
}

impl ProviderConfig {
    const fn default_max_retries() -> u32 {
        3
    }

    /// Create a new provider config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the default model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Set timeout configuration
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set max retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// True iff an API key is present and not an obvious placeholder.
    ///
    /// This is a pure credential check; it never performs network I/O.
    pub fn has_valid_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !is_placeholder_key(key))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.timeouts.validate()?;
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("base URL must be http(s): {url}"));
            }
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_model: None,
            timeouts: TimeoutConfig::default(),
            max_retries: Self::default_max_retries(),
        }
    }
}

/// Keys that were clearly never filled in: empty strings and the usual
/// template values people leave behind in .env files.
fn is_placeholder_key(key: &str) -> bool {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    lower.starts_with("your-")
        || lower.starts_with("your_")
        || matches!(lower.as_str(), "changeme" | "placeholder" | "none" | "xxx")
}
