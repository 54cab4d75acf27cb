//! High-level completion operations
//!
//! The façade business features talk to: every operation sanitizes its
//! inputs, renders a fixed prompt template, routes the request through the
//! provider registry, and — where structured output is expected — extracts
//! and validates the JSON before anything reaches the caller.

pub mod extraction;
pub mod sanitize;
pub mod schemas;


pub use schemas::{ContentAnalysis, PersonaProfile, Sentiment};

use crate::error::{ChorusError, ChorusResult};
use crate::llm::messages::{CompletionRequest, LlmMessage};
use crate::llm::provider_types::ProviderKind;
use crate::llm::registry::ProviderRegistry;
use std::sync::Arc;
use tracing::{instrument, warn};

const MAX_VARIATIONS: usize = 10;

/// Completion service façade.
///
/// Holds a shared registry handle and no other state; cheap to clone and
/// safe for unlimited concurrent callers.
#[derive(Clone)]
pub struct CompletionService {
    registry: Arc<ProviderRegistry>,
    preferred: Option<ProviderKind>,
}

impl CompletionService {
    /// Create a service over a constructed registry
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            preferred: None,
        }
    }

    /// Prefer one provider for every operation of this service handle
    pub fn with_preferred_provider(mut self, provider: ProviderKind) -> Self {
        self.preferred = Some(provider);
        self
    }

    /// The registry this service routes through
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Plain text generation: prompt plus optional system prompt.
    #[instrument(skip(self, prompt, system))]
    pub async fn generate_text(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> ChorusResult<String> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(LlmMessage::system(sanitize::sanitize_prose(system)));
        }
        messages.push(LlmMessage::user(sanitize::sanitize_prose(prompt)));

        let request = CompletionRequest::new(messages);
        let result = self.registry.complete(&request, self.preferred).await?;
        Ok(result.content.trim().to_string())
    }

    /// Generate a persona profile from a free-text description.
    ///
    /// Raises `ExtractionFailed("persona")` when the model output cannot be
    /// parsed into a valid profile; never returns a partial one.
    #[instrument(skip(self, description))]
    pub async fn generate_persona(&self, description: &str) -> ChorusResult<PersonaProfile> {
        let description = sanitize::sanitize_prose(description);
        let prompt = format!(
            "Create a persona profile based on this description: {description}\n\n\
             Respond with a single JSON object with these fields:\n\
             \"name\" (string, at most 100 characters),\n\
             \"bio\" (string, at most 500 characters),\n\
             \"tone\" (one of: {tones}),\n\
             \"interests\" (array of at most 10 short strings),\n\
             \"writing_style\" (optional string, at most 500 characters).\n\
             Return only the JSON object.",
            tones = schemas::PERSONA_TONES.join(", "),
        );

        let request = CompletionRequest::new(vec![
            LlmMessage::system("You generate persona profiles as strict JSON."),
            LlmMessage::user(prompt),
        ]);
        let result = self.registry.complete(&request, self.preferred).await?;

        let value = extraction::parse_json_block(&result.content)
            .map_err(|e| ChorusError::extraction_failed("persona", e.to_string()))?;
        schemas::validate_persona(&value)
    }

    /// Refine existing content according to instructions.
    #[instrument(skip(self, original, instructions))]
    pub async fn refine_content(
        &self,
        original: &str,
        instructions: &str,
    ) -> ChorusResult<String> {
        let original = sanitize::sanitize_prose(original);
        let instructions = sanitize::sanitize_prose(instructions);
        let prompt = format!(
            "Improve the following content according to the instructions.\n\n\
             Content: {original}\n\nInstructions: {instructions}\n\n\
             Respond with the improved content only, no commentary."
        );

        let request = CompletionRequest::new(vec![LlmMessage::user(prompt)]);
        let result = self.registry.complete(&request, self.preferred).await?;
        Ok(result.content.trim().to_string())
    }

    /// Generate distinct variations of a piece of content.
    ///
    /// `count` is clamped to 1..=10. Raises `ExtractionFailed("variations")`
    /// when the model does not produce a usable JSON array.
    #[instrument(skip(self, content))]
    pub async fn generate_variations(
        &self,
        content: &str,
        count: usize,
    ) -> ChorusResult<Vec<String>> {
        let count = count.clamp(1, MAX_VARIATIONS);
        let content = sanitize::sanitize_prose(content);
        let prompt = format!(
            "Write {count} distinct variations of the following content, \
             keeping the meaning but changing the wording.\n\n\
             Content: {content}\n\n\
             Respond with a JSON array of exactly {count} strings and nothing else."
        );

        let request = CompletionRequest::new(vec![LlmMessage::user(prompt)]);
        let result = self.registry.complete(&request, self.preferred).await?;

        let value = extraction::parse_json_block(&result.content)
            .map_err(|e| ChorusError::extraction_failed("variations", e.to_string()))?;
        schemas::validate_variations(&value, count)
    }

    /// Analyze content sentiment, tone, and topics.
    ///
    /// Best-effort: when the model output cannot be parsed or validated the
    /// neutral fallback is returned instead of an error. Transport failures
    /// still propagate.
    #[instrument(skip(self, content))]
    pub async fn analyze_content(&self, content: &str) -> ChorusResult<ContentAnalysis> {
        let content = sanitize::sanitize_prose(content);
        let prompt = format!(
            "Analyze the following content.\n\nContent: {content}\n\n\
             Respond with a single JSON object with fields:\n\
             \"sentiment\" (one of: positive, neutral, negative),\n\
             \"tone\" (short string),\n\
             \"topics\" (array of short strings),\n\
             \"suggestions\" (array of short strings).\n\
             Return only the JSON object."
        );

        let request = CompletionRequest::new(vec![LlmMessage::user(prompt)]);
        let result = self.registry.complete(&request, self.preferred).await?;

        let analysis = extraction::parse_json_block(&result.content)
            .and_then(|value| schemas::validate_analysis(&value));
        match analysis {
            Ok(analysis) => Ok(analysis),
            Err(error) => {
                warn!(error = %error, "content analysis degraded to neutral fallback");
                Ok(ContentAnalysis::fallback())
            }
        }
    }
}
