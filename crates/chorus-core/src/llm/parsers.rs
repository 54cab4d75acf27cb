//! Vendor response normalization
//!
//! Each parser turns one vendor's success body into a [`CompletionResult`],
//! including the finish-reason vocabulary mapping. Malformed bodies fail the
//! call; a result is never partially filled.

use crate::error::{ChorusError, ChorusResult};
use crate::llm::messages::{CompletionResult, FinishReason, LlmUsage};
use serde_json::Value;

/// Response parser for the supported vendors
pub struct ResponseParser;

impl ResponseParser {
    /// Parse an OpenAI chat-completion response
    pub fn parse_openai(response: Value, requested_model: &str) -> ChorusResult<CompletionResult> {
        let choice = response["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| {
                ChorusError::json_with_context(
                    "no choices in response",
                    "parsing OpenAI completion response",
                )
            })?;

        let content = choice["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(CompletionResult {
            content,
            model: model_or_requested(&response["model"], requested_model),
            usage: parse_usage(
                &response["usage"],
                "prompt_tokens",
                "completion_tokens",
                "total_tokens",
            ),
            finish_reason: choice["finish_reason"]
                .as_str()
                .and_then(finish_reason_from_openai),
        })
    }

    /// Parse an Anthropic messages response.
    ///
    /// Text blocks in the content array are concatenated; usage totals are
    /// derived from input and output token counts.
    pub fn parse_anthropic(
        response: Value,
        requested_model: &str,
    ) -> ChorusResult<CompletionResult> {
        let blocks = response["content"].as_array().ok_or_else(|| {
            ChorusError::json_with_context(
                "no content array in response",
                "parsing Anthropic completion response",
            )
        })?;

        let mut content = String::new();
        for block in blocks {
            if block["type"].as_str() == Some("text") {
                if let Some(text) = block["text"].as_str() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(text);
                }
            }
        }

        let usage = response["usage"].as_object().map(|usage| {
            let prompt = usage
                .get("input_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32;
            let completion = usage
                .get("output_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32;
            LlmUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }
        });

        Ok(CompletionResult {
            content,
            model: model_or_requested(&response["model"], requested_model),
            usage,
            finish_reason: response["stop_reason"]
                .as_str()
                .and_then(finish_reason_from_anthropic),
        })
    }

    /// Parse a Google Gemini generateContent response
    pub fn parse_google(response: Value, requested_model: &str) -> ChorusResult<CompletionResult> {
        let candidate = response["candidates"]
            .as_array()
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| {
                ChorusError::json_with_context(
                    "no candidates in response",
                    "parsing Google completion response",
                )
            })?;

        let mut content = String::new();
        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                if let Some(text) = part["text"].as_str() {
                    content.push_str(text);
                }
            }
        }

        Ok(CompletionResult {
            content,
            model: requested_model.to_string(),
            usage: parse_usage(
                &response["usageMetadata"],
                "promptTokenCount",
                "candidatesTokenCount",
                "totalTokenCount",
            ),
            finish_reason: candidate["finishReason"]
                .as_str()
                .and_then(finish_reason_from_google),
        })
    }
}

fn model_or_requested(reported: &Value, requested: &str) -> String {
    reported
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| requested.to_string())
}

fn parse_usage(usage: &Value, prompt_key: &str, completion_key: &str, total_key: &str) -> Option<LlmUsage> {
    let usage = usage.as_object()?;
    let read = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let prompt_tokens = read(prompt_key);
    let completion_tokens = read(completion_key);
    let reported_total = read(total_key);
    Some(LlmUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens: if reported_total > 0 {
            reported_total
        } else {
            prompt_tokens + completion_tokens
        },
    })
}

pub(crate) fn finish_reason_from_openai(reason: &str) -> Option<FinishReason> {
    match reason {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

pub(crate) fn finish_reason_from_anthropic(reason: &str) -> Option<FinishReason> {
    match reason {
        "end_turn" | "stop_sequence" => Some(FinishReason::Stop),
        "max_tokens" => Some(FinishReason::Length),
        _ => None,
    }
}

pub(crate) fn finish_reason_from_google(reason: &str) -> Option<FinishReason> {
    match reason {
        "STOP" => Some(FinishReason::Stop),
        "MAX_TOKENS" => Some(FinishReason::Length),
        "SAFETY" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn openai_response_maps_content_usage_and_finish_reason() {
        let response = json!({
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });

        let result = ResponseParser::parse_openai(response, "gpt-4o").unwrap();
        assert_eq!(result.content, "Hello!");
        assert_eq!(result.finish_reason, Some(FinishReason::Stop));
        assert_eq!(result.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn openai_without_choices_is_an_error() {
        let response = json!({"id": "x", "choices": []});
        assert!(ResponseParser::parse_openai(response, "gpt-4o").is_err());
    }

    #[test]
    fn unmapped_finish_reason_normalizes_to_none() {
        let response = json!({
            "choices": [{
                "message": {"content": "hi"},
                "finish_reason": "function_call"
            }]
        });
        let result = ResponseParser::parse_openai(response, "gpt-4o").unwrap();
        assert_eq!(result.finish_reason, None);
    }

    #[test]
    fn anthropic_text_blocks_are_concatenated() {
        let response = json!({
            "model": "claude-sonnet-4",
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 4}
        });

        let result = ResponseParser::parse_anthropic(response, "claude-sonnet-4").unwrap();
        assert_eq!(result.content, "Hello\nworld");
        assert_eq!(result.finish_reason, Some(FinishReason::Stop));
        assert_eq!(result.usage.unwrap().total_tokens, 16);
    }

    #[test]
    fn google_safety_maps_to_content_filter() {
        let response = json!({
            "candidates": [{
                "content": {"parts": [{"text": "partial"}]},
                "finishReason": "SAFETY"
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 2, "totalTokenCount": 9}
        });

        let result = ResponseParser::parse_google(response, "gemini-2.0-flash").unwrap();
        assert_eq!(result.finish_reason, Some(FinishReason::ContentFilter));
        assert_eq!(result.model, "gemini-2.0-flash");
    }
}
