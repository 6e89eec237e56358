//! Bounded-chunk body relaying
//!
//! Turns an upstream byte stream into the stream handed to axum as the
//! response body. Each yielded item becomes its own body frame, which hyper
//! writes to the caller's socket before polling for the next one; that is
//! what makes token-by-token output visible while it is produced.

use std::io;

use bytes::Bytes;
use futures::{Stream, StreamExt};

/// How a relayed body ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Upstream reached end of stream
    Completed,
    /// Upstream body failed after headers were committed
    UpstreamError,
    /// The caller went away and the body was dropped before the end
    ClientDisconnected,
}

impl StreamOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOutcome::Completed => "completed",
            StreamOutcome::UpstreamError => "upstream_error",
            StreamOutcome::ClientDisconnected => "client_disconnected",
        }
    }
}

/// Totals reported once a relayed body is finished or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub outcome: StreamOutcome,
    pub chunks: usize,
    pub bytes: u64,
}

/// Reports the summary exactly once, including when the stream is dropped
/// mid-way because the caller disconnected.
struct SummaryGuard<F: FnOnce(StreamSummary)> {
    outcome: Option<StreamOutcome>,
    chunks: usize,
    bytes: u64,
    on_finish: Option<F>,
}

impl<F: FnOnce(StreamSummary)> SummaryGuard<F> {
    fn count(&mut self, chunk: &Bytes) {
        self.chunks += 1;
        self.bytes += chunk.len() as u64;
    }
}

impl<F: FnOnce(StreamSummary)> Drop for SummaryGuard<F> {
    fn drop(&mut self) {
        if let Some(on_finish) = self.on_finish.take() {
            on_finish(StreamSummary {
                outcome: self.outcome.unwrap_or(StreamOutcome::ClientDisconnected),
                chunks: self.chunks,
                bytes: self.bytes,
            });
        }
    }
}

/// Relay `upstream` as chunks of at most `chunk_size` bytes.
///
/// Empty chunks are skipped. An upstream error is yielded once as an
/// `io::Error` and ends the stream, which makes hyper abort the connection
/// instead of finishing the body cleanly. `on_finish` receives the outcome.
pub fn relay_chunks<S, E, F>(
    upstream: S,
    chunk_size: usize,
    on_finish: F,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce(StreamSummary) + Send + 'static,
{
    let chunk_size = chunk_size.max(1);

    async_stream::stream! {
        let mut guard = SummaryGuard {
            outcome: None,
            chunks: 0,
            bytes: 0,
            on_finish: Some(on_finish),
        };
        let mut upstream = Box::pin(upstream);

        while let Some(next) = upstream.next().await {
            match next {
                Ok(mut data) => {
                    while !data.is_empty() {
                        let chunk = data.split_to(chunk_size.min(data.len()));
                        guard.count(&chunk);
                        yield Ok(chunk);
                    }
                }
                Err(e) => {
                    guard.outcome = Some(StreamOutcome::UpstreamError);
                    yield Err(io::Error::other(e));
                    return;
                }
            }
        }

        guard.outcome = Some(StreamOutcome::Completed);
    }
}
