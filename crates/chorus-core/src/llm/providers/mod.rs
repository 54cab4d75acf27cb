//! Provider-specific implementations

pub mod anthropic;
mod anthropic_stream;
pub mod error_utils;
pub mod google;
pub mod openai;
mod openai_stream;
pub mod provider_trait;

#[cfg(test)]
mod openai_tests;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use openai::OpenAiProvider;
pub use provider_trait::{CompletionProvider, ProviderInstance};

use crate::config::ProviderConfig;
use crate::error::{ChorusError, ChorusResult};
use crate::llm::provider_types::ProviderKind;
use reqwest::Client;

impl ProviderInstance {
    /// Construct the adapter for a configured provider
    pub fn from_config(kind: ProviderKind, config: ProviderConfig) -> ChorusResult<Self> {
        Ok(match kind {
            ProviderKind::OpenAi => Self::OpenAi(OpenAiProvider::new(config)?),
            ProviderKind::Anthropic => Self::Anthropic(AnthropicProvider::new(config)?),
            ProviderKind::Google => Self::Google(GoogleProvider::new(config)?),
        })
    }
}

/// Build the HTTP client one adapter uses for its lifetime.
///
/// The connection pool inside is safe for concurrent use by reqwest's own
/// contract.
pub(crate) fn build_http_client(
    config: &ProviderConfig,
    kind: ProviderKind,
) -> ChorusResult<Client> {
    config.validate().map_err(|e| {
        ChorusError::config_with_context(
            format!("invalid provider config: {e}"),
            format!("validating configuration for provider '{}'", kind.name()),
        )
    })?;

    Client::builder()
        .connect_timeout(config.timeouts.connection_timeout())
        .timeout(config.timeouts.request_timeout())
        .build()
        .map_err(|e| {
            ChorusError::config_with_context(
                format!("failed to create HTTP client: {e}"),
                format!("building HTTP client for provider '{}'", kind.name()),
            )
        })
}
