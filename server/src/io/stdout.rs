use dirstream_core::{DirectoryLister, ServerConfig, WriterSink};
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Stream one listing to stdout as NDJSON.
///
/// Uses the same pipeline as the HTTP endpoint; stdout's write readiness
/// provides the backpressure. Logs go to stderr.
pub async fn run_list(config: &ServerConfig, request: &str) -> anyhow::Result<()> {
    info!("Listing {:?} under {}", request, config.root_dir.display());
    let lister = DirectoryLister::new(&config.root_dir);
    list_into(&lister, request, tokio::io::stdout()).await
}

/// Stream the listing of `request` into `writer`.
///
/// A reader that goes away early (e.g. `| head`) is not an error.
pub async fn list_into<W>(lister: &DirectoryLister, request: &str, writer: W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut sink = WriterSink::new(writer);
    match lister
        .stream(request, &mut sink, CancellationToken::new())
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if e.is_disconnect() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
