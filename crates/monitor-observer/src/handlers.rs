//! HTTP endpoint handlers for the reporting server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Dashboard document (built-in status page if absent) |
//! | `GET` | `/status` | Full aggregate state as JSON |
//! | `POST` | `/update` | Ingest one event report |
//! | `GET` | anything else | Static file from the asset root, or 404 |
//! | other | anything else | 404 with an empty body |

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use monitor_types::{MonitorEvent, SystemState};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

use crate::error::ObserverError;
use crate::state::AppState;

/// Acknowledgement body for `POST /update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct UpdateAck {
    /// Always `"ok"`.
    pub status: &'static str,
}

impl UpdateAck {
    const OK: Self = Self { status: "ok" };
}

// ---------------------------------------------------------------------------
// GET /status
// ---------------------------------------------------------------------------

/// Return the full aggregate state.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<SystemState> {
    Json(state.snapshot().await)
}

// ---------------------------------------------------------------------------
// POST /update
// ---------------------------------------------------------------------------

/// Decode an event report and fold it into the state.
///
/// The body is read as JSON whatever the `Content-Type`. Unknown event
/// kinds are acknowledged without effect; malformed reports get a 400.
pub async fn update(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<UpdateAck>, ObserverError> {
    let event = MonitorEvent::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected event report");
        ObserverError::from(e)
    })?;

    state.apply(&event).await;

    Ok(Json(UpdateAck::OK))
}

// ---------------------------------------------------------------------------
// GET / -- dashboard
// ---------------------------------------------------------------------------

/// Serve the dashboard document, or the built-in status page when the
/// configured document does not exist.
pub async fn index(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let path = state.assets.dashboard_path();
    let installed = tokio::fs::metadata(&path)
        .await
        .is_ok_and(|meta| meta.is_file());

    if installed {
        return into_response(ServeFile::new(path).oneshot(request).await);
    }

    let snapshot = state.snapshot().await;
    status_page(&snapshot).into_response()
}

// ---------------------------------------------------------------------------
// Fallback -- static files
// ---------------------------------------------------------------------------

/// Serve unmatched `GET`/`HEAD` paths from the asset root. Every other
/// method gets a bare 404.
pub async fn static_fallback(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return StatusCode::NOT_FOUND.into_response();
    }

    into_response(ServeDir::new(&state.assets.root).oneshot(request).await)
}

fn into_response<R: IntoResponse>(result: Result<R, Infallible>) -> Response {
    match result {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// ---------------------------------------------------------------------------
// Built-in status page
// ---------------------------------------------------------------------------

fn status_page(snapshot: &SystemState) -> Html<String> {
    let producers_online = snapshot.producers.values().filter(|e| e.connected).count();
    let producers_total = snapshot.producers.len();
    let consumers_online = snapshot.consumers.values().filter(|e| e.connected).count();
    let consumers_total = snapshot.consumers.len();
    let total_messages = snapshot.broker.total_messages;
    let recent = snapshot.messages.len();
    let broker = if snapshot.broker.active {
        "ACTIVE"
    } else {
        "DOWN"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="2">
    <title>Pipeline Monitor</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Pipeline Monitor</h1>
    <p class="subtitle">No dashboard document installed -- showing built-in status page</p>

    <p>Broker: <span class="status">{broker}</span></p>

    <div>
        <div class="metric">
            <div class="label">Producers online</div>
            <div class="value">{producers_online} / {producers_total}</div>
        </div>
        <div class="metric">
            <div class="label">Consumers online</div>
            <div class="value">{consumers_online} / {consumers_total}</div>
        </div>
        <div class="metric">
            <div class="label">Messages</div>
            <div class="value">{total_messages}</div>
        </div>
        <div class="metric">
            <div class="label">Recent window</div>
            <div class="value">{recent}</div>
        </div>
    </div>

    <hr>

    <h2>API</h2>
    <ul>
        <li>GET <a href="/status">/status</a> -- Full system state</li>
        <li>POST /update -- Report an event</li>
        <li><code>ws://host:port/ws/events</code> -- Live event stream</li>
    </ul>
</body>
</html>"#
    ))
}
