use std::convert::Infallible;
use std::io;

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tailer::{TailError, TailSession};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use super::page;
use super::params::{Prompt, ViewerParams};
use super::sink::ChannelSink;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Viewer pages must never be served from a cache.
const NO_CACHE: [(header::HeaderName, &str); 2] = [
    (header::CACHE_CONTROL, "no-cache, must-revalidate"),
    (header::EXPIRES, "Mon, 26 Jul 1997 05:00:00 GMT"),
];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(index_handler))
        .route("/logs/viewer", get(viewer_handler))
}

/// Log selection page
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(page::selection_page(state.spip.topology()))
}

/// Tail of one log as a streamed HTML page
async fn viewer_handler(
    State(state): State<AppState>,
    Query(params): Query<ViewerParams>,
) -> impl IntoResponse {
    (NO_CACHE, view(state, params).await)
}

async fn view(state: AppState, params: ViewerParams) -> ApiResult<Response> {
    let request = match params.to_request(&state.spip) {
        Ok(request) => request,
        Err(Prompt::SelectLog) => return Ok(Html(page::SELECT_LOG).into_response()),
        Err(Prompt::SelectStream) => return Ok(Html(page::SELECT_STREAM).into_response()),
    };
    let autoscroll = request.autoscroll;

    // Opening touches the filesystem, keep it off the async workers.
    let config = (*state.tailer).clone();
    let opened = tokio::task::spawn_blocking(move || TailSession::open(request, config))
        .await
        .map_err(|e| ApiError::Internal(format!("viewer task failed: {}", e)))?;

    let session = match opened {
        Ok(session) => session,
        Err(err) => {
            if err.is_unavailable() {
                state.metrics.log_unavailable();
                warn!(error = %err, "Requested log is unavailable");
            }
            return Err(err.into());
        }
    };

    let log = session
        .request()
        .source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (tx, rx) = mpsc::channel(state.config.server.stream_buffer);
    let metrics = state.metrics.clone();
    metrics.session_started(&log);

    tokio::task::spawn_blocking(move || {
        let mut sink = ChannelSink::new(tx);
        match session.run(&mut sink) {
            Ok(_) => {}
            Err(TailError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(log = %log, lines = sink.lines_sent(), "Viewer went away, ending session");
            }
            Err(e) => {
                warn!(log = %log, error = %e, "Log view ended early");
            }
        }
        // lines that reached the viewer, however the session ended
        metrics.session_ended(&log, sink.lines_sent());
    });

    let body = stream::once(async move { Bytes::from(page::viewer_header(autoscroll)) })
        .chain(ReceiverStream::new(rx))
        .chain(stream::once(async { Bytes::from_static(page::VIEWER_FOOTER.as_bytes()) }))
        .map(Ok::<_, Infallible>);

    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}
