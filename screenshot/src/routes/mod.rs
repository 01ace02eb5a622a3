//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two endpoints: `POST /` renders a URL to PNG, `GET /healthz` reports
//! liveness. CORS is open so the portal can call the service directly from
//! the browser.

pub mod capture;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(capture::capture))
        .route("/healthz", get(capture::healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
