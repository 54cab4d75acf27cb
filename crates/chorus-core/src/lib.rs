//! Chorus Core Library
//!
//! Multi-provider LLM completion routing: a fixed set of vendor adapters
//! behind one trait, a shared retry policy, fallback across providers,
//! bounded streaming, and a high-level completion service with input
//! sanitization and structured-output validation.

pub mod config;
pub mod error;
pub mod llm;
pub mod service;

// Re-export commonly used types
pub use config::ProviderConfig;
pub use error::{ChorusError, ChorusResult};
pub use llm::messages::{
    CompletionRequest, CompletionResult, FinishReason, LlmMessage, LlmUsage, MessageRole,
};
pub use llm::provider_types::{ProviderKind, TimeoutConfig};
pub use llm::providers::{CompletionProvider, ProviderInstance};
pub use llm::registry::ProviderRegistry;
pub use llm::streaming::{CompletionStream, StreamChunk};
pub use service::{CompletionService, ContentAnalysis, PersonaProfile, Sentiment};
