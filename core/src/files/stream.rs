//! Backpressured delivery of encoded records.
//!
//! The pipeline is pull-driven: one entry is enumerated, resolved and
//! encoded, and the next is not touched until the sink has accepted the
//! current line. A slow consumer therefore stalls the whole chain, and at
//! most one record is held by the producer at any time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::encoder::{client_path, RecordEncoder};
use super::enumerator::{DirectoryEnumerator, EntrySource};
use super::metadata::{LocalMetadata, MetadataResolver, MetadataSource};
use super::resolver::PathResolver;
use crate::errors::{ListingError, StreamError};

/// Consumer side of the pipeline.
///
/// `send_line` must not resolve until the sink can take more data; that
/// wait is the backpressure signal.
#[async_trait::async_trait]
pub trait LineSink: Send {
    /// Offer one encoded line.
    async fn send_line(&mut self, line: Vec<u8>) -> Result<(), StreamError>;

    /// Signal end-of-stream after the last line.
    async fn finish(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

/// Sink writing lines to any async writer, flushing after each line.
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> LineSink for WriterSink<W> {
    async fn send_line(&mut self, line: Vec<u8>) -> Result<(), StreamError> {
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), StreamError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Counters for one listing. Never shared between requests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub streamed: u64,
    pub skipped: u64,
}

/// Drives one directory listing into a [`LineSink`].
pub struct StreamWriter<E> {
    entries: E,
    parent: PathBuf,
    resolver: MetadataResolver,
    encoder: RecordEncoder,
}

impl<E: EntrySource> StreamWriter<E> {
    pub fn new(
        entries: E,
        parent: impl Into<PathBuf>,
        resolver: MetadataResolver,
        encoder: RecordEncoder,
    ) -> Self {
        Self {
            entries,
            parent: parent.into(),
            resolver,
            encoder,
        }
    }

    /// The directory being listed.
    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Stream every entry into `sink`, in enumeration order.
    ///
    /// Entries whose metadata cannot be resolved are skipped. The first
    /// sink error, enumeration error or cancellation stops the walk; the
    /// entry source is dropped on return in every case, which closes the
    /// directory handle.
    pub async fn attach<S>(
        mut self,
        sink: &mut S,
        shutdown: CancellationToken,
    ) -> Result<StreamSummary, StreamError>
    where
        S: LineSink + ?Sized,
    {
        let mut summary = StreamSummary::default();

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Err(StreamError::Cancelled),
                next = self.entries.next_entry() => next?,
            };
            let Some(raw) = next else {
                break;
            };

            let Some(resolved) = self.resolver.resolve(&self.parent, raw).await else {
                summary.skipped += 1;
                continue;
            };

            let line = self.encoder.encode(&resolved)?;
            sink.send_line(line).await?;
            summary.streamed += 1;
        }

        sink.finish().await?;
        Ok(summary)
    }
}

/// Entry point for listings under one root: resolves, opens, and hands back
/// a ready [`StreamWriter`].
///
/// Everything that can fail before the first byte is written happens in
/// [`DirectoryLister::open`].
#[derive(Clone)]
pub struct DirectoryLister {
    paths: PathResolver,
    metadata: Arc<dyn MetadataSource>,
}

impl DirectoryLister {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_metadata(root, Arc::new(LocalMetadata))
    }

    pub fn with_metadata(root: impl AsRef<Path>, metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            paths: PathResolver::new(root),
            metadata,
        }
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Resolve `request` and open the directory it names.
    pub async fn open(
        &self,
        request: &str,
    ) -> Result<StreamWriter<DirectoryEnumerator>, ListingError> {
        let safe_path = self.paths.resolve(request)?;
        let entries = DirectoryEnumerator::open(&safe_path).await?;
        Ok(StreamWriter::new(
            entries,
            safe_path,
            MetadataResolver::new(self.metadata.clone()),
            RecordEncoder::new(self.root()),
        ))
    }

    /// Open `request` and stream it into `sink`, logging the outcome.
    pub async fn stream<S>(
        &self,
        request: &str,
        sink: &mut S,
        shutdown: CancellationToken,
    ) -> Result<StreamSummary, StreamError>
    where
        S: LineSink + ?Sized,
    {
        let writer = self.open(request).await?;
        let display = client_path(self.root(), writer.parent());
        let result = writer.attach(sink, shutdown).await;
        log_outcome(&display, &result);
        result
    }
}

/// Log the end of a listing at a level matching its cause.
pub fn log_outcome(path: &str, result: &Result<StreamSummary, StreamError>) {
    match result {
        Ok(summary) => info!(
            "Streamed {} entries from: {} ({} skipped)",
            summary.streamed, path, summary.skipped
        ),
        Err(e) if e.is_disconnect() => debug!("Consumer left while streaming {}", path),
        Err(StreamError::Cancelled) => debug!("Listing of {} cancelled", path),
        Err(e) => error!("Error during streaming of {}: {}", path, e),
    }
}
