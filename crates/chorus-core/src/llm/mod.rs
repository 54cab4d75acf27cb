//! Completion routing engine: providers, retry, fallback, streaming

pub mod messages;
pub mod parsers;
pub mod provider_types;
pub mod providers;
pub mod registry;
pub mod retry;
pub mod sse_decoder;
pub mod streaming;


pub use messages::{CompletionRequest, CompletionResult, FinishReason, LlmMessage, LlmUsage, MessageRole};
pub use provider_types::{ProviderKind, TimeoutConfig};
pub use providers::{CompletionProvider, ProviderInstance};
pub use registry::ProviderRegistry;
pub use retry::with_retry;
pub use sse_decoder::{SseDecoder, SseEvent};
pub use streaming::{CompletionStream, StreamChunk};
