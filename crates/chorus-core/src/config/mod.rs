//! Engine configuration
//!
//! Providers are configured entirely through environment-style key/value
//! settings; nothing here is read again after startup.

pub mod env_loader;
pub mod provider;

pub use env_loader::{default_provider_from_env, provider_config_from_env, registry_configs_from_env};
pub use provider::ProviderConfig;
