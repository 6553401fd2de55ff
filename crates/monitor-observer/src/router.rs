//! Axum router construction for the reporting API.
//!
//! Assembles all routes into a single [`Router`] with permissive CORS so the
//! dashboard can poll from any origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the reporting server.
///
/// The router includes:
/// - `GET /` -- dashboard document
/// - `GET /status` -- aggregate state JSON
/// - `POST /update` -- event ingestion
/// - `GET /ws/events` -- `WebSocket` event stream
/// - everything else -- static files for `GET`/`HEAD`, 404 otherwise
///
/// Methods a route does not handle fall through to the static handler, so
/// `POST /status` is a 404 rather than a 405.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/",
            get(handlers::index).fallback(handlers::static_fallback),
        )
        .route(
            "/status",
            get(handlers::status).fallback(handlers::static_fallback),
        )
        .route(
            "/update",
            post(handlers::update).fallback(handlers::static_fallback),
        )
        .route(
            "/ws/events",
            get(ws::ws_events).fallback(handlers::static_fallback),
        )
        .fallback(handlers::static_fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
