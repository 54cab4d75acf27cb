//! OpenAI provider implementation

use crate::config::ProviderConfig;
use crate::error::ChorusResult;
use crate::llm::messages::{CompletionRequest, CompletionResult};
use crate::llm::parsers::ResponseParser;
use crate::llm::provider_types::ProviderKind;
use crate::llm::providers::error_utils;
use crate::llm::retry::with_retry;
use crate::llm::streaming::{self, CompletionStream};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const AVAILABLE_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"];

/// OpenAI provider handler
pub struct OpenAiProvider {
    config: ProviderConfig,
    http_client: Client,
    default_model: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    pub fn new(config: ProviderConfig) -> ChorusResult<Self> {
        let http_client = super::build_http_client(&config, ProviderKind::OpenAi)?;
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

    fn request_body(&self, request: &CompletionRequest, model: &str, stream: bool) -> Value {
        let mut body = json!({
            "model": model,
            "messages": request.messages,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(penalty) = request.frequency_penalty {
            body["frequency_penalty"] = json!(penalty);
        }
        if let Some(penalty) = request.presence_penalty {
            body["presence_penalty"] = json!(penalty);
        }
        if let Some(stop) = &request.stop {
            body["stop"] = json!(stop);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    async fn send_completion(
        &self,
        request: &CompletionRequest,
        model: &str,
    ) -> ChorusResult<CompletionResult> {
        let url = format!("{}/chat/completions", self.base_url());
        let mut http_request = self
            .http_client
            .post(&url)
            .json(&self.request_body(request, model, false));

        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|e| {
            error_utils::request_error(
                e,
                ProviderKind::OpenAi,
                self.config.timeouts.request_timeout_secs,
            )
        })?;

        if !response.status().is_success() {
            return Err(error_utils::classify_http_error(response, ProviderKind::OpenAi).await);
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| error_utils::parse_error(e, ProviderKind::OpenAi))?;

        ResponseParser::parse_openai(response_json, model)
    }
}

#[async_trait]
impl super::CompletionProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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

    #[instrument(skip(self, request), fields(provider = "openai"), level = "debug")]
    async fn complete(&self, request: &CompletionRequest) -> ChorusResult<CompletionResult> {
        request.validate()?;
        let request = request.normalized();
        let model = self.model_for(&request);
        with_retry(ProviderKind::OpenAi, self.config.max_retries, || {
            self.send_completion(&request, &model)
        })
        .await
    }

    async fn stream(&self, request: &CompletionRequest) -> ChorusResult<CompletionStream> {
        request.validate()?;
        let request = request.normalized();
        let model = self.model_for(&request);

        let url = format!("{}/chat/completions", self.base_url());
        let mut http_request = self
            .http_client
            .post(&url)
            // the stream outlives the client's request timeout; the guard
            // below enforces the real lifetime bound
            .timeout(self.config.timeouts.stream_max_duration())
            .json(&self.request_body(&request, &model, true));

        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|e| {
            error_utils::request_error(
                e,
                ProviderKind::OpenAi,
                self.config.timeouts.request_timeout_secs,
            )
        })?;

        if !response.status().is_success() {
            return Err(error_utils::classify_http_error(response, ProviderKind::OpenAi).await);
        }

        let inner = super::openai_stream::sse_stream(response.bytes_stream());
        Ok(streaming::bounded(inner, &self.config.timeouts))
    }
}
