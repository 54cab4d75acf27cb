//! Google (Gemini) provider implementation
//!
//! Completion only; the streaming capability is not implemented for this
//! provider and the registry routes streaming requests past it.

use crate::config::ProviderConfig;
use crate::error::{ChorusError, ChorusResult};
use crate::llm::messages::{CompletionRequest, CompletionResult, MessageRole};
use crate::llm::parsers::ResponseParser;
use crate::llm::provider_types::ProviderKind;
use crate::llm::providers::error_utils;
use crate::llm::retry::with_retry;
use crate::llm::streaming::CompletionStream;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const AVAILABLE_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-pro", "gemini-1.5-flash"];

/// Google (Gemini) provider handler
pub struct GoogleProvider {
    config: ProviderConfig,
    http_client: Client,
    default_model: String,
}

impl GoogleProvider {
    /// Create a new Google provider
    pub fn new(config: ProviderConfig) -> ChorusResult<Self> {
        let http_client = super::build_http_client(&config, ProviderKind::Google)?;
        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            config,
            http_client,
            default_model,
        })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn model_for(&self, request: &CompletionRequest) -> String {
        request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Gemini has no system role and no assistant name: system messages
    /// become a systemInstruction, assistant turns use the "model" role.
    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();
        for message in &request.messages {
            match message.role {
                MessageRole::System => system_parts.push(message.content.as_str()),
                MessageRole::User => contents.push(json!({
                    "role": "user",
                    "parts": [{"text": message.content}],
                })),
                MessageRole::Assistant => contents.push(json!({
                    "role": "model",
                    "parts": [{"text": message.content}],
                })),
            }
        }

        let mut body = json!({ "contents": contents });

        if !system_parts.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{"text": system_parts.join("\n\n")}],
            });
        }

        let mut generation_config = json!({});
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            generation_config["topP"] = json!(top_p);
        }
        if let Some(stop) = &request.stop {
            generation_config["stopSequences"] = json!(stop);
        }
        if generation_config
            .as_object()
            .is_some_and(|obj| !obj.is_empty())
        {
            body["generationConfig"] = generation_config;
        }

        body
    }

    async fn send_completion(
        &self,
        request: &CompletionRequest,
        model: &str,
    ) -> ChorusResult<CompletionResult> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ChorusError::auth("Google API key not provided", ProviderKind::Google.name())
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url(),
            model,
            api_key
        );

        let response = self
            .http_client
            .post(&url)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| {
                error_utils::request_error(
                    e,
                    ProviderKind::Google,
                    self.config.timeouts.request_timeout_secs,
                )
            })?;

        if !response.status().is_success() {
            return Err(error_utils::classify_http_error(response, ProviderKind::Google).await);
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| error_utils::parse_error(e, ProviderKind::Google))?;

        ResponseParser::parse_google(response_json, model)
    }
}

#[async_trait]
impl super::CompletionProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn is_available(&self) -> bool {
        self.config.has_valid_api_key()
    }

    fn available_models(&self) -> &[&str] {
        AVAILABLE_MODELS
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn supports_streaming(&self) -> bool {
        false
    }

    #[instrument(skip(self, request), fields(provider = "google"), level = "debug")]
    async fn complete(&self, request: &CompletionRequest) -> ChorusResult<CompletionResult> {
        request.validate()?;
        let request = request.normalized();
        let model = self.model_for(&request);
        with_retry(ProviderKind::Google, self.config.max_retries, || {
            self.send_completion(&request, &model)
        })
        .await
    }

    async fn stream(&self, _request: &CompletionRequest) -> ChorusResult<CompletionStream> {
        Err(ChorusError::unknown(
            "streaming is not supported by the google provider",
            ProviderKind::Google.name(),
            false,
        ))
    }
}
