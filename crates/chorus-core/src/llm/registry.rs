//! Provider registry and fallback routing
//!
//! The registry is built once at process start and read-only afterwards:
//! one adapter per configured provider, a default provider, and a total
//! fallback order. A request walks that order strictly sequentially until
//! a provider succeeds, a non-retryable error aborts the chain, or every
//! candidate has failed.

use crate::config::{self, ProviderConfig};
use crate::error::{ChorusError, ChorusResult};
use crate::llm::messages::{CompletionRequest, CompletionResult};
use crate::llm::provider_types::ProviderKind;
use crate::llm::providers::{CompletionProvider, ProviderInstance};
use crate::llm::streaming::CompletionStream;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Fixed mapping of configured providers with a precomputed fallback order.
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, ProviderInstance>,
    default_provider: ProviderKind,
    fallback_order: Vec<ProviderKind>,
}

impl ProviderRegistry {
    /// Build a registry from explicit provider configurations.
    ///
    /// The default provider is the first configured entry of the global
    /// preference order; use [`ProviderRegistry::with_default`] to override.
    pub fn new(configs: Vec<(ProviderKind, ProviderConfig)>) -> ChorusResult<Self> {
        Self::with_default(configs, None)
    }

    /// Build a registry with an explicit default provider.
    pub fn with_default(
        configs: Vec<(ProviderKind, ProviderConfig)>,
        default: Option<ProviderKind>,
    ) -> ChorusResult<Self> {
        if configs.is_empty() {
            return Err(ChorusError::config("no providers configured"));
        }

        let mut providers = HashMap::new();
        for (kind, provider_config) in configs {
            if providers.contains_key(&kind) {
                return Err(ChorusError::config(format!(
                    "duplicate configuration for provider '{kind}'"
                )));
            }
            providers.insert(kind, ProviderInstance::from_config(kind, provider_config)?);
        }

        let default_provider = match default {
            Some(kind) => {
                if !providers.contains_key(&kind) {
                    return Err(ChorusError::config(format!(
                        "default provider '{kind}' is not configured"
                    )));
                }
                kind
            }
            None => ProviderKind::PREFERENCE_ORDER
                .into_iter()
                .find(|kind| providers.contains_key(kind))
                .expect("non-empty registry has a configured provider"),
        };

        let mut fallback_order = vec![default_provider];
        fallback_order.extend(
            ProviderKind::PREFERENCE_ORDER
                .into_iter()
                .filter(|kind| *kind != default_provider && providers.contains_key(kind)),
        );

        debug!(
            default = %default_provider,
            order = ?fallback_order.iter().map(|k| k.name()).collect::<Vec<_>>(),
            "provider registry constructed"
        );

        Ok(Self {
            providers,
            default_provider,
            fallback_order,
        })
    }

    /// Build a registry from the environment triplets.
    pub fn from_env() -> ChorusResult<Self> {
        let configs = config::registry_configs_from_env();
        let default = config::default_provider_from_env()
            .filter(|kind| configs.iter().any(|(configured, _)| configured == kind));
        Self::with_default(configs, default)
    }

    /// The provider used when no explicit preference is given
    pub fn default_provider(&self) -> ProviderKind {
        self.default_provider
    }

    /// The fixed fallback order computed at construction
    pub fn fallback_order(&self) -> &[ProviderKind] {
        &self.fallback_order
    }

    /// Kinds with a configured adapter, in fallback order
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.fallback_order.clone()
    }

    /// Look up one configured provider
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderInstance> {
        self.providers.get(&kind)
    }

    /// The attempt order for one request: the explicitly requested provider
    /// if configured, otherwise the default, followed by the remaining
    /// fallback order.
    fn resolve_order(&self, preferred: Option<ProviderKind>) -> Vec<ProviderKind> {
        match preferred.filter(|kind| self.providers.contains_key(kind)) {
            Some(first) => {
                let mut order = vec![first];
                order.extend(self.fallback_order.iter().copied().filter(|k| *k != first));
                order
            }
            None => self.fallback_order.clone(),
        }
    }

    /// Route a completion request through the fallback chain.
    ///
    /// Providers reporting `is_available() == false` are skipped without
    /// consuming any retry budget. A non-retryable error aborts the chain
    /// immediately: such errors are request-shaped, and another vendor
    /// would fail the same way.
    #[instrument(skip(self, request), fields(preferred = ?preferred.map(|p| p.name())))]
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        preferred: Option<ProviderKind>,
    ) -> ChorusResult<CompletionResult> {
        request.validate()?;

        let mut last_error: Option<ChorusError> = None;
        let mut attempted = 0u32;

        for kind in self.resolve_order(preferred) {
            let provider = &self.providers[&kind];
            if !provider.is_available() {
                debug!(provider = %kind, "skipping unavailable provider");
                continue;
            }

            attempted += 1;
            match provider.complete(request).await {
                Ok(result) => {
                    if attempted > 1 {
                        info!(provider = %kind, "fell back to provider");
                    }
                    return Ok(result);
                }
                Err(error) if error.is_retryable() => {
                    warn!(provider = %kind, error = %error, "provider failed, trying next");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(Self::exhausted(last_error, attempted))
    }

    /// Route a streaming request through the fallback chain.
    ///
    /// Same ordering and skip policy as [`ProviderRegistry::complete`],
    /// applied to stream establishment; providers without the streaming
    /// capability are passed over.
    #[instrument(skip(self, request), fields(preferred = ?preferred.map(|p| p.name())))]
    pub async fn stream(
        &self,
        request: &CompletionRequest,
        preferred: Option<ProviderKind>,
    ) -> ChorusResult<CompletionStream> {
        request.validate()?;

        let mut last_error: Option<ChorusError> = None;
        let mut attempted = 0u32;

        for kind in self.resolve_order(preferred) {
            let provider = &self.providers[&kind];
            if !provider.is_available() {
                debug!(provider = %kind, "skipping unavailable provider");
                continue;
            }
            if !provider.supports_streaming() {
                debug!(provider = %kind, "skipping provider without streaming");
                continue;
            }

            attempted += 1;
            match provider.stream(request).await {
                Ok(stream) => {
                    if attempted > 1 {
                        info!(provider = %kind, "fell back to provider for streaming");
                    }
                    return Ok(stream);
                }
                Err(error) if error.is_retryable() => {
                    warn!(provider = %kind, error = %error, "stream setup failed, trying next");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(Self::exhausted(last_error, attempted))
    }

    /// Terminal failure: the last concrete error when anything was tried,
    /// the exhaustion error when nothing was.
    fn exhausted(last_error: Option<ChorusError>, attempted: u32) -> ChorusError {
        match last_error {
            Some(error) if attempted > 0 => error,
            _ => ChorusError::all_providers_failed(
                "no configured provider was available to attempt the request",
            ),
        }
    }
}
