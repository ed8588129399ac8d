use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// Everything the server needs: where the finished animation lives.
///
/// The file is only ever replaced by rename, so concurrent readers see
/// either the previous or the new artifact, never a partial one.
pub struct AppState {
    pub gif_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET|POST /gif: the most recently encoded animation
async fn serve_gif(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read(&state.gif_path).await {
        Ok(bytes) => {
            debug!(bytes = bytes.len(), "serving animation");
            ([(header::CONTENT_TYPE, "image/gif")], bytes).into_response()
        }
        Err(e) => {
            error!(path = state.gif_path.display().to_string(), error = %e, "failed to read animation");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Router / server
// ---------------------------------------------------------------------------

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/gif", get(serve_gif).post(serve_gif))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, path = state.gif_path.display().to_string(), "animation server listening");
    axum::serve(listener, router(state)).await
}
