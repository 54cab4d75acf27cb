//! Anthropic provider implementation

use crate::config::ProviderConfig;
use crate::error::ChorusResult;
use crate::llm::messages::{CompletionRequest, CompletionResult, LlmMessage, MessageRole};
use crate::llm::parsers::ResponseParser;
use crate::llm::provider_types::ProviderKind;
use crate::llm::providers::error_utils;
use crate::llm::retry::with_retry;
use crate::llm::streaming::{self, CompletionStream};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";
// the Messages API requires max_tokens on every request
const FALLBACK_MAX_TOKENS: u32 = 4096;
const AVAILABLE_MODELS: &[&str] = &[
    "claude-sonnet-4-5",
    "claude-3-7-sonnet-latest",
    "claude-3-5-haiku-latest",
];

/// Anthropic provider handler
pub struct AnthropicProvider {
    config: ProviderConfig,
    http_client: Client,
    default_model: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: ProviderConfig) -> ChorusResult<Self> {
        let http_client = super::build_http_client(&config, ProviderKind::Anthropic)?;
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

    /// Anthropic takes the system prompt as a top-level field, not as a
    /// message; multiple system messages are joined in order.
    fn split_system(messages: &[LlmMessage]) -> (Option<String>, Vec<&LlmMessage>) {
        let mut system_parts = Vec::new();
        let mut conversation = Vec::new();
        for message in messages {
            match message.role {
                MessageRole::System => system_parts.push(message.content.as_str()),
                _ => conversation.push(message),
            }
        }
        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };
        (system, conversation)
    }

    fn request_body(&self, request: &CompletionRequest, model: &str, stream: bool) -> Value {
        let (system, conversation) = Self::split_system(&request.messages);

        let messages: Vec<Value> = conversation
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
        });

        if let Some(system) = system {
            body["system"] = json!(system);
        }
        // the API rejects temperature and top_p together; temperature wins
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        } else if let Some(top_p) = request.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(stop) = &request.stop {
            body["stop_sequences"] = json!(stop);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    fn authenticated_post(&self, url: &str, body: &Value) -> reqwest::RequestBuilder {
        let mut http_request = self.http_client.post(url).json(body);
        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.header("x-api-key", api_key);
        }
        http_request.header("anthropic-version", API_VERSION)
    }

    async fn send_completion(
        &self,
        request: &CompletionRequest,
        model: &str,
    ) -> ChorusResult<CompletionResult> {
        let url = format!("{}/v1/messages", self.base_url());
        let body = self.request_body(request, model, false);

        let response = self.authenticated_post(&url, &body).send().await.map_err(|e| {
            error_utils::request_error(
                e,
                ProviderKind::Anthropic,
                self.config.timeouts.request_timeout_secs,
            )
        })?;

        if !response.status().is_success() {
            return Err(error_utils::classify_http_error(response, ProviderKind::Anthropic).await);
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| error_utils::parse_error(e, ProviderKind::Anthropic))?;

        ResponseParser::parse_anthropic(response_json, model)
    }
}

#[async_trait]
impl super::CompletionProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
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

    #[instrument(skip(self, request), fields(provider = "anthropic"), level = "debug")]
    async fn complete(&self, request: &CompletionRequest) -> ChorusResult<CompletionResult> {
        request.validate()?;
        let request = request.normalized();
        let model = self.model_for(&request);
        with_retry(ProviderKind::Anthropic, self.config.max_retries, || {
            self.send_completion(&request, &model)
        })
        .await
    }

    async fn stream(&self, request: &CompletionRequest) -> ChorusResult<CompletionStream> {
        request.validate()?;
        let request = request.normalized();
        let model = self.model_for(&request);

        let url = format!("{}/v1/messages", self.base_url());
        let body = self.request_body(&request, &model, true);

        let response = self
            .authenticated_post(&url, &body)
            .timeout(self.config.timeouts.stream_max_duration())
            .send()
            .await
            .map_err(|e| {
                error_utils::request_error(
                    e,
                    ProviderKind::Anthropic,
                    self.config.timeouts.request_timeout_secs,
                )
            })?;

        if !response.status().is_success() {
            return Err(error_utils::classify_http_error(response, ProviderKind::Anthropic).await);
        }

        let inner = super::anthropic_stream::sse_stream(response.bytes_stream());
        Ok(streaming::bounded(inner, &self.config.timeouts))
    }
}
