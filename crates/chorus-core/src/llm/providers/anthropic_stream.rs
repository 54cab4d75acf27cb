//! Anthropic SSE stream parsing
//!
//! The Messages API streams typed events:
//! - `content_block_delta` carries incremental text (`text_delta`)
//! - `message_stop` marks the end of the message
//! - `error` carries a mid-stream failure
//!
//! Everything else (message_start, content_block_start/stop, message_delta,
//! ping) is metadata this engine does not surface.

use crate::error::{ChorusError, ChorusResult};
use crate::llm::sse_decoder::{SseDecoder, SseEvent};
use crate::llm::streaming::{CompletionStream, StreamChunk};
use futures::{Stream, StreamExt};
use serde_json::Value;

/// Parse an Anthropic-format SSE byte stream into completion chunks.
pub(super) fn sse_stream(
    byte_stream: impl Stream<Item = Result<impl AsRef<[u8]> + Send + 'static, reqwest::Error>>
    + Send
    + 'static,
) -> CompletionStream {
    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut byte_stream = std::pin::pin!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(ChorusError::unknown(
                        format!("stream error: {e}"),
                        "anthropic",
                        true,
                    ));
                    return;
                }
            };

            for event in decoder.feed(bytes.as_ref()) {
                match process_event(&event) {
                    Some(Ok(chunk)) => {
                        let finished = chunk.done;
                        yield Ok(chunk);
                        if finished {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(e);
                        return;
                    }
                    None => {}
                }
            }
        }
    })
}

fn process_event(event: &SseEvent) -> Option<ChorusResult<StreamChunk>> {
    let data: Value = serde_json::from_str(&event.data).ok()?;
    let event_type = event
        .event_type
        .as_deref()
        .or_else(|| data["type"].as_str())?;

    match event_type {
        "content_block_delta" => {
            let delta = &data["delta"];
            if delta["type"].as_str() != Some("text_delta") {
                return None;
            }
            let text = delta["text"].as_str()?;
            if text.is_empty() {
                return None;
            }
            Some(Ok(StreamChunk::content(text)))
        }
        "message_stop" => Some(Ok(StreamChunk::finished())),
        "error" => {
            let message = data["error"]["message"].as_str().unwrap_or("unknown error");
            Some(Err(ChorusError::unknown(
                format!("stream error: {message}"),
                "anthropic",
                false,
            )))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::streaming;

    fn byte_stream(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<&'static [u8], reqwest::Error>> {
        futures::stream::iter(parts.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn parses_text_deltas_until_message_stop() {
        let stream = sse_stream(byte_stream(vec![
            b"event: message_start\ndata: {\"type\":\"message_start\"}\n\n",
            b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n",
            b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"lo\"}}\n\n",
            b"event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
        ]));

        let content = streaming::collect(stream).await.unwrap();
        assert_eq!(content, "Hello");
    }

    #[tokio::test]
    async fn error_event_fails_the_stream() {
        let stream = sse_stream(byte_stream(vec![
            b"event: error\ndata: {\"type\":\"error\",\"error\":{\"message\":\"overloaded\"}}\n\n" as &[u8],
        ]));

        let err = streaming::collect(stream).await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));
    }
}
