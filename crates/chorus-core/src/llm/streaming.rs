//! Streaming response support
//!
//! A completion stream is lazy, finite, and non-restartable: exactly one
//! consumer pulls chunks until `done`, an error, or the end of the
//! underlying connection. Vendor connections can go silent without closing,
//! so every provider stream is wrapped with an idle window and a hard
//! lifetime bound before it reaches the caller.

use crate::error::{ChorusError, ChorusResult};
use crate::llm::provider_types::TimeoutConfig;
use futures::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// A chunk of streaming response data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Incremental content
    pub content: String,
    /// Whether this is the final chunk
    pub done: bool,
}

impl StreamChunk {
    /// Create a content chunk
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            done: false,
        }
    }

    /// Create the terminal chunk
    pub fn finished() -> Self {
        Self {
            content: String::new(),
            done: true,
        }
    }
}

/// Stream of completion chunks
pub type CompletionStream = Pin<Box<dyn Stream<Item = ChorusResult<StreamChunk>> + Send>>;

/// Bound a provider stream with the configured idle window and lifetime.
///
/// The returned stream fails with a `Timeout` error if no chunk arrives
/// within the idle window, or once the wall-clock deadline passes; the
/// deadline fires through a cancellation token so an exceeded lifetime and
/// an external cancel take the same path.
pub fn bounded(inner: CompletionStream, timeouts: &TimeoutConfig) -> CompletionStream {
    bounded_with_cancel(inner, timeouts, CancellationToken::new())
}

/// Like [`bounded`], with a caller-supplied cancellation token. Cancelling
/// the token promptly aborts an in-flight chunk read.
pub fn bounded_with_cancel(
    mut inner: CompletionStream,
    timeouts: &TimeoutConfig,
    cancel: CancellationToken,
) -> CompletionStream {
    let idle = timeouts.stream_idle_timeout();
    let lifetime = timeouts.stream_max_duration();

    Box::pin(async_stream::stream! {
        let deadline = tokio::time::Instant::now() + lifetime;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    yield Err(ChorusError::Cancelled);
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    // signal any cooperating holder of the token as well
                    cancel.cancel();
                    yield Err(ChorusError::timeout_with_context(
                        lifetime.as_secs(),
                        "stream exceeded its maximum lifetime",
                    ));
                    break;
                }
                next = tokio::time::timeout(idle, inner.next()) => match next {
                    Err(_) => {
                        cancel.cancel();
                        yield Err(ChorusError::timeout_with_context(
                            idle.as_secs(),
                            "no stream chunk within the idle window",
                        ));
                        break;
                    }
                    Ok(None) => break,
                    Ok(Some(item)) => {
                        let finished = matches!(&item, Ok(chunk) if chunk.done);
                        yield item;
                        if finished {
                            break;
                        }
                    }
                }
            }
        }
    })
}

/// Drain a stream into the concatenated content.
///
/// Stops at the terminal chunk or the end of the stream; the first error
/// aborts the collection.
pub async fn collect(mut stream: CompletionStream) -> ChorusResult<String> {
    let mut content = String::new();
    while let Some(item) = stream.next().await {
        let chunk = item?;
        content.push_str(&chunk.content);
        if chunk.done {
            break;
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&str]) -> CompletionStream {
        let mut items: Vec<ChorusResult<StreamChunk>> =
            parts.iter().map(|p| Ok(StreamChunk::content(*p))).collect();
        items.push(Ok(StreamChunk::finished()));
        Box::pin(futures::stream::iter(items))
    }

    #[tokio::test]
    async fn collect_concatenates_until_done() {
        let content = collect(chunks(&["Hel", "lo", "!"])).await.unwrap();
        assert_eq!(content, "Hello!");
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_fails_on_the_idle_window() {
        let timeouts = TimeoutConfig::default();
        let mut stream = bounded(Box::pin(futures::stream::pending()), &timeouts);

        let item = stream.next().await.unwrap();
        match item {
            Err(ChorusError::Timeout { seconds, .. }) => {
                assert_eq!(seconds, timeouts.stream_idle_timeout_secs)
            }
            other => panic!("expected idle timeout, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn lifetime_deadline_cuts_off_a_chatty_stream() {
        // idle window longer than the lifetime so only the deadline can fire
        let timeouts = TimeoutConfig::default()
            .with_stream_idle_timeout_secs(600)
            .with_stream_max_duration_secs(120);
        let mut stream = bounded(Box::pin(futures::stream::pending()), &timeouts);

        let item = stream.next().await.unwrap();
        match item {
            Err(ChorusError::Timeout { seconds, .. }) => assert_eq!(seconds, 120),
            other => panic!("expected lifetime timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn external_cancel_aborts_the_stream() {
        let cancel = CancellationToken::new();
        let timeouts = TimeoutConfig::default();
        let mut stream = bounded_with_cancel(
            Box::pin(futures::stream::pending()),
            &timeouts,
            cancel.clone(),
        );

        cancel.cancel();
        let item = stream.next().await.unwrap();
        assert!(matches!(item, Err(ChorusError::Cancelled)));
    }

    #[tokio::test]
    async fn stream_ends_at_the_terminal_chunk() {
        let timeouts = TimeoutConfig::default();
        let mut stream = bounded(chunks(&["a"]), &timeouts);

        assert_eq!(stream.next().await.unwrap().unwrap(), StreamChunk::content("a"));
        assert!(stream.next().await.unwrap().unwrap().done);
        assert!(stream.next().await.is_none());
    }
}
