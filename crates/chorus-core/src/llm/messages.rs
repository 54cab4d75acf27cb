//! Completion message and result types

use serde::{Deserialize, Serialize};

use crate::error::{ChorusError, ChorusResult};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,
    /// User message (human input)
    User,
    /// Assistant message (model response)
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a completion conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl LlmMessage {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request.
///
/// Immutable once constructed: the engine never mutates a caller's request,
/// it only derives a normalized copy via [`CompletionRequest::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Ordered conversation history
    pub messages: Vec<LlmMessage>,
    /// Model override; falls back to the provider's default model
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum output tokens
    pub max_tokens: Option<u32>,
    /// Top-p sampling
    pub top_p: Option<f32>,
    /// Frequency penalty
    pub frequency_penalty: Option<f32>,
    /// Presence penalty
    pub presence_penalty: Option<f32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

impl CompletionRequest {
    /// Create a request from a conversation
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop: None,
        }
    }

    /// Set the model override
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max output tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set top-p
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set frequency penalty
    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// Set presence penalty
    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Set stop sequences
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Reject requests no provider may attempt.
    ///
    /// An empty message sequence is an input error, not a network error;
    /// it must be caught before any dispatch.
    pub fn validate(&self) -> ChorusResult<()> {
        if self.messages.is_empty() {
            return Err(ChorusError::invalid_input_field(
                "completion request has no messages",
                "messages",
            ));
        }
        Ok(())
    }

    /// Derive the copy actually sent to a provider: message content trimmed,
    /// everything else untouched.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        for message in &mut normalized.messages {
            message.content = message.content.trim().to_string();
        }
        normalized
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Why the model stopped generating.
///
/// Vendor vocabularies are normalized into this set; anything unmapped
/// surfaces as `None` on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of turn or a stop sequence
    Stop,
    /// Output token limit reached
    Length,
    /// Content filtered by the vendor
    ContentFilter,
}

impl FinishReason {
    /// Canonical string form
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ContentFilter => "content_filter",
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A successful completion, fully populated or not produced at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Generated text
    pub content: String,
    /// Model that produced the completion
    pub model: String,
    /// Token usage, when the vendor reports it
    pub usage: Option<LlmUsage>,
    /// Normalized finish reason
    pub finish_reason: Option<FinishReason>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_messages_fail_validation() {
        let request = CompletionRequest::new(Vec::new());
        let err = request.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_retryable());
    }

    #[test]
    fn normalized_trims_without_mutating_the_original() {
        let request = CompletionRequest::new(vec![LlmMessage::user("  hello  ")]);
        let normalized = request.normalized();
        assert_eq!(normalized.messages[0].content, "hello");
        assert_eq!(request.messages[0].content, "  hello  ");
    }

    #[test]
    fn builder_sets_generation_parameters() {
        let request = CompletionRequest::new(vec![LlmMessage::user("hi")])
            .with_model("gpt-4o")
            .with_temperature(0.2)
            .with_max_tokens(256)
            .with_stop(vec!["END".to_string()]);
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.stop.as_deref(), Some(&["END".to_string()][..]));
    }
}
