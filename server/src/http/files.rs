//! `GET /api/files` handler.

use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use dirstream_core::files::encoder::client_path;
use dirstream_core::files::stream::log_outcome;
use serde::Deserialize;
use tracing::{error, warn};

use super::body::BodySink;
use super::errors::ApiError;
use super::AppState;

/// Media type of the listing body.
pub const NDJSON: &str = "application/x-ndjson";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Root-relative directory; absent or empty means the root.
    #[serde(default)]
    pub path: Option<String>,
}

/// Stream one directory level as NDJSON.
///
/// Containment and open failures are answered with a JSON error before
/// the body starts. Once the response is returned, records are produced
/// by a detached task that runs only as fast as the client reads.
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let request = query.path.unwrap_or_default();

    let writer = state.lister.open(&request).await.map_err(|e| {
        if e.is_forbidden() {
            warn!("Rejected path outside root: {:?}", request);
        } else {
            error!("Failed to read directory {:?}: {}", request, e);
        }
        ApiError::from(e)
    })?;

    let display = client_path(state.lister.root(), writer.parent());
    let shutdown = state.shutdown.child_token();
    let (mut sink, body) = BodySink::channel(state.stream_buffer);

    tokio::spawn(async move {
        let result = writer.attach(&mut sink, shutdown).await;
        log_outcome(&display, &result);
        if let Err(e) = result {
            if !e.is_disconnect() {
                sink.abort(&e).await;
            }
        }
    });

    Ok(([(CONTENT_TYPE, NDJSON), (CACHE_CONTROL, "no-cache")], body).into_response())
}
