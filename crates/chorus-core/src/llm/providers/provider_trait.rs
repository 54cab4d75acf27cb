//! Provider trait and unified enum

use crate::error::ChorusResult;
use crate::llm::messages::{CompletionRequest, CompletionResult};
use crate::llm::provider_types::ProviderKind;
use crate::llm::streaming::CompletionStream;
use async_trait::async_trait;

/// Unified contract every provider adapter implements.
///
/// Adapters hold no per-request state, so one instance serves unlimited
/// concurrent callers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Which provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// True iff required credentials are present and well-formed.
    /// Never performs network I/O.
    fn is_available(&self) -> bool;

    /// Models this adapter knows about, preferred first
    fn available_models(&self) -> &[&str];

    /// The model used when the request carries no override
    fn default_model(&self) -> &str;

    /// Whether this adapter implements [`CompletionProvider::stream`]
    fn supports_streaming(&self) -> bool {
        true
    }

    /// Send a chat completion request, retried internally per the shared
    /// retry policy.
    async fn complete(&self, request: &CompletionRequest) -> ChorusResult<CompletionResult>;

    /// Open a streaming completion. The returned stream is finite,
    /// non-restartable, and already bounded by the idle/lifetime guards.
    async fn stream(&self, request: &CompletionRequest) -> ChorusResult<CompletionStream>;
}

/// Unified provider enum wrapping the fixed set of adapter implementations.
///
/// The vendor set is closed at compile time; no open-ended plugin loading.
pub enum ProviderInstance {
    OpenAi(super::OpenAiProvider),
    Anthropic(super::AnthropicProvider),
    Google(super::GoogleProvider),
}

#[async_trait]
impl CompletionProvider for ProviderInstance {
    fn kind(&self) -> ProviderKind {
        match self {
            Self::OpenAi(p) => p.kind(),
            Self::Anthropic(p) => p.kind(),
            Self::Google(p) => p.kind(),
        }
    }

    fn is_available(&self) -> bool {
        match self {
            Self::OpenAi(p) => p.is_available(),
            Self::Anthropic(p) => p.is_available(),
            Self::Google(p) => p.is_available(),
        }
    }

    fn available_models(&self) -> &[&str] {
        match self {
            Self::OpenAi(p) => p.available_models(),
            Self::Anthropic(p) => p.available_models(),
            Self::Google(p) => p.available_models(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            Self::OpenAi(p) => p.default_model(),
            Self::Anthropic(p) => p.default_model(),
            Self::Google(p) => p.default_model(),
        }
    }

    fn supports_streaming(&self) -> bool {
        match self {
            Self::OpenAi(p) => p.supports_streaming(),
            Self::Anthropic(p) => p.supports_streaming(),
            Self::Google(p) => p.supports_streaming(),
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> ChorusResult<CompletionResult> {
        match self {
            Self::OpenAi(p) => p.complete(request).await,
            Self::Anthropic(p) => p.complete(request).await,
            Self::Google(p) => p.complete(request).await,
        }
    }

    async fn stream(&self, request: &CompletionRequest) -> ChorusResult<CompletionStream> {
        match self {
            Self::OpenAi(p) => p.stream(request).await,
            Self::Anthropic(p) => p.stream(request).await,
            Self::Google(p) => p.stream(request).await,
        }
    }
}
