//! Environment variable-based configuration loading
//!
//! Each provider is configured by one triplet:
//! `{VENDOR}_API_KEY` (required for the provider to be configured at all),
//! `{VENDOR}_BASE_URL` (optional override), `{VENDOR}_DEFAULT_MODEL`
//! (optional override). `CHORUS_DEFAULT_PROVIDER` picks the default entry
//! of the fallback order.

use crate::config::provider::ProviderConfig;
use crate::llm::provider_types::ProviderKind;
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Load the configuration for one provider from its environment triplet.
///
/// Returns `None` when `{VENDOR}_API_KEY` is unset — the provider is then
/// simply not configured. An empty or placeholder key still yields a config;
/// availability is decided later by `has_valid_api_key`.
pub fn provider_config_from_env(kind: ProviderKind) -> Option<ProviderConfig> {
    let prefix = kind.env_prefix();
    let api_key = env::var(format!("{prefix}_API_KEY")).ok()?;

    let mut config = ProviderConfig::new().with_api_key(api_key);
    if let Ok(base_url) = env::var(format!("{prefix}_BASE_URL")) {
        config = config.with_base_url(base_url);
    }
    if let Ok(model) = env::var(format!("{prefix}_DEFAULT_MODEL")) {
        config = config.with_default_model(model);
    }
    Some(config)
}

/// Collect the environment configuration of every known provider, in the
/// global preference order.
pub fn registry_configs_from_env() -> Vec<(ProviderKind, ProviderConfig)> {
    ProviderKind::PREFERENCE_ORDER
        .into_iter()
        .filter_map(|kind| provider_config_from_env(kind).map(|config| (kind, config)))
        .collect()
}

/// Read `CHORUS_DEFAULT_PROVIDER`, ignoring values that don't name a known
/// provider.
pub fn default_provider_from_env() -> Option<ProviderKind> {
    let raw = env::var("CHORUS_DEFAULT_PROVIDER").ok()?;
    match ProviderKind::from_str(&raw) {
        Ok(kind) => Some(kind),
        Err(_) => {
            warn!("ignoring CHORUS_DEFAULT_PROVIDER: unknown provider '{raw}'");
            None
        }
    }
}
