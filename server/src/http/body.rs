//! Response body fed by the listing pipeline.

use axum::body::{Body, Bytes};
use dirstream_core::{LineSink, StreamError};
use futures_util::stream;
use tokio::sync::mpsc;

type Chunk = Result<Bytes, std::io::Error>;

/// Sink handing lines to the HTTP response through a bounded channel.
///
/// The channel only drains as fast as the connection accepts bytes, so a
/// full channel suspends the producer. A dropped body (client gone) closes
/// the channel and the next send fails.
pub struct BodySink {
    tx: mpsc::Sender<Chunk>,
}

impl BodySink {
    /// Create a sink and the response body it feeds.
    pub fn channel(capacity: usize) -> (Self, Body) {
        let (tx, rx) = mpsc::channel::<Chunk>(capacity.max(1));
        let chunks = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        });
        (Self { tx }, Body::from_stream(chunks))
    }

    /// Terminate the body with an error so the connection ends without a
    /// clean end-of-stream.
    pub async fn abort(self, reason: &StreamError) {
        let err = std::io::Error::other(reason.to_string());
        let _ = self.tx.send(Err(err)).await;
    }
}

#[async_trait::async_trait]
impl LineSink for BodySink {
    async fn send_line(&mut self, line: Vec<u8>) -> Result<(), StreamError> {
        self.tx
            .send(Ok(Bytes::from(line)))
            .await
            .map_err(|_| StreamError::ConsumerDisconnected)
    }
}
