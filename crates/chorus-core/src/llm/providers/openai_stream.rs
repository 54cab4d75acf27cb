//! OpenAI SSE stream parsing
//!
//! OpenAI streams `data:` events carrying chat.completion.chunk payloads,
//! terminated by a literal `data: [DONE]`.

use crate::error::{ChorusError, ChorusResult};
use crate::llm::sse_decoder::SseDecoder;
use crate::llm::streaming::{CompletionStream, StreamChunk};
use futures::{Stream, StreamExt};
use serde_json::Value;

/// Parse an OpenAI-format SSE byte stream into completion chunks.
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
                        "openai",
                        true,
                    ));
                    return;
                }
            };

            for event in decoder.feed(bytes.as_ref()) {
                if event.is_done() {
                    yield Ok(StreamChunk::finished());
                    return;
                }
                if let Some(item) = delta_content(&event.data) {
                    yield item;
                }
            }
        }
    })
}

/// Extract the delta text from one chunk payload. Events without content
/// (role prelude, finish markers) produce nothing.
fn delta_content(data: &str) -> Option<ChorusResult<StreamChunk>> {
    let payload: Value = serde_json::from_str(data).ok()?;
    let content = payload["choices"]
        .as_array()?
        .first()?["delta"]["content"]
        .as_str()?;
    if content.is_empty() {
        return None;
    }
    Some(Ok(StreamChunk::content(content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::streaming;

    fn byte_stream(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<&'static [u8], reqwest::Error>> {
        futures::stream::iter(parts.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn parses_deltas_and_done_marker() {
        let stream = sse_stream(byte_stream(vec![
            b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: [DONE]\n\n",
        ]));

        let content = streaming::collect(stream).await.unwrap();
        assert_eq!(content, "Hello");
    }

    #[tokio::test]
    async fn event_split_across_network_chunks_is_reassembled() {
        let stream = sse_stream(byte_stream(vec![
            b"data: {\"choices\":[{\"delta\":{\"cont",
            b"ent\":\"hi\"}}]}\n\ndata: [DONE]\n\n",
        ]));

        let content = streaming::collect(stream).await.unwrap();
        assert_eq!(content, "hi");
    }
}
