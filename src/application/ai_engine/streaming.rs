//! Cancellable streaming delivery.

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::ports::{AIError, ChunkStream};

/// Where a streaming generation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Generating,
    Completed,
    Failed,
    Cancelled,
}

/// Cancels the paired [`StreamingChannel`]. Cloneable and idempotent.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Ordered, forward-only text chunks with cooperative cancellation.
///
/// After [`CancelHandle::cancel`] no further chunk is pulled from upstream and
/// the upstream stream is dropped. Chunks already delivered stay delivered.
pub struct StreamingChannel {
    inner: Option<ChunkStream>,
    cancel: watch::Receiver<bool>,
    // Cleared once every cancel handle is dropped
    watching: bool,
    state: StreamState,
}

impl StreamingChannel {
    pub fn new(inner: ChunkStream) -> (Self, CancelHandle) {
        let (sender, cancel) = watch::channel(false);
        let channel = Self {
            inner: Some(inner),
            cancel,
            watching: true,
            state: StreamState::Generating,
        };
        (
            channel,
            CancelHandle {
                sender: Arc::new(sender),
            },
        )
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Next text delta, or `None` once finished, failed or cancelled.
    pub async fn next_chunk(&mut self) -> Option<Result<String, AIError>> {
        loop {
            if *self.cancel.borrow() {
                self.finish(StreamState::Cancelled);
                return None;
            }
            let inner = self.inner.as_mut()?;

            let next = tokio::select! {
                biased;
                changed = self.cancel.changed(), if self.watching => {
                    self.watching = changed.is_ok();
                    continue;
                }
                next = inner.next() => next,
            };

            match next {
                Some(Ok(chunk)) if chunk.is_final() => {
                    self.finish(StreamState::Completed);
                    return None;
                }
                Some(Ok(chunk)) if chunk.delta.is_empty() => continue,
                Some(Ok(chunk)) => return Some(Ok(chunk.delta)),
                Some(Err(err)) => {
                    self.finish(StreamState::Failed);
                    return Some(Err(err));
                }
                None => {
                    self.finish(StreamState::Completed);
                    return None;
                }
            }
        }
    }

    /// Reads the remaining chunks into one string.
    pub async fn collect_text(&mut self) -> Result<String, AIError> {
        let mut text = String::new();
        while let Some(chunk) = self.next_chunk().await {
            text.push_str(&chunk?);
        }
        Ok(text)
    }

    pub fn into_stream(self) -> BoxStream<'static, Result<String, AIError>> {
        stream::unfold(self, |mut channel| async move {
            channel.next_chunk().await.map(|chunk| (chunk, channel))
        })
        .boxed()
    }

    fn finish(&mut self, state: StreamState) {
        if self.state == StreamState::Generating {
            debug!(?state, "stream finished");
            self.state = state;
        }
        self.inner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::ports::{AIProvider, CompletionRequest, RequestMetadata, StreamChunk};
    use std::time::Duration;

    async fn mock_stream(provider: MockAIProvider) -> ChunkStream {
        provider
            .stream_complete(CompletionRequest::new(RequestMetadata::new("t", "conversation")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delivers_chunks_in_order_then_completes() {
        let provider = MockAIProvider::new().with_stream_chunks(["Level ", "5 ", "slab"]);
        let (mut channel, _cancel) = StreamingChannel::new(mock_stream(provider).await);

        assert_eq!(channel.collect_text().await.unwrap(), "Level 5 slab");
        assert_eq!(channel.state(), StreamState::Completed);
        assert!(channel.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn no_chunk_after_cancel() {
        let provider = MockAIProvider::new()
            .with_stream_chunks(["a", "b", "c", "d"])
            .with_chunk_delay(Duration::from_millis(20));
        let (mut channel, cancel) = StreamingChannel::new(mock_stream(provider).await);

        assert_eq!(channel.next_chunk().await.unwrap().unwrap(), "a");
        cancel.cancel();
        assert!(cancel.is_cancelled());
        assert!(channel.next_chunk().await.is_none());
        assert!(channel.next_chunk().await.is_none());
        assert_eq!(channel.state(), StreamState::Cancelled);
    }

    #[tokio::test]
    async fn cancel_interrupts_a_pending_chunk() {
        let provider = MockAIProvider::new()
            .with_stream_chunks(["slow"])
            .with_chunk_delay(Duration::from_secs(5));
        let (mut channel, cancel) = StreamingChannel::new(mock_stream(provider).await);

        let waiter = tokio::spawn(async move { (channel.next_chunk().await, channel.state()) });
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let (chunk, state) = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(chunk.is_none());
        assert_eq!(state, StreamState::Cancelled);
    }

    #[tokio::test]
    async fn upstream_error_fails_the_stream() {
        let inner: ChunkStream = Box::pin(stream::iter(vec![
            Ok(StreamChunk::content("partial")),
            Err(AIError::network("reset")),
            Ok(StreamChunk::content("never")),
        ]));
        let (mut channel, _cancel) = StreamingChannel::new(inner);

        assert_eq!(channel.next_chunk().await.unwrap().unwrap(), "partial");
        assert!(channel.next_chunk().await.unwrap().is_err());
        assert!(channel.next_chunk().await.is_none());
        assert_eq!(channel.state(), StreamState::Failed);
    }

    #[tokio::test]
    async fn into_stream_yields_text() {
        let provider = MockAIProvider::new().with_stream_chunks(["x", "y"]);
        let (channel, _cancel) = StreamingChannel::new(mock_stream(provider).await);
        let chunks: Vec<String> = channel
            .into_stream()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn dropped_handle_does_not_stall_delivery() {
        let provider = MockAIProvider::new().with_stream_chunks(["one ", "two"]);
        let (mut channel, cancel) = StreamingChannel::new(mock_stream(provider).await);
        drop(cancel);
        assert_eq!(channel.collect_text().await.unwrap(), "one two");
    }
}
