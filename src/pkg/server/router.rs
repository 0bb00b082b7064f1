use axum::routing::put;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::state::AppState;

pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/jobs", get(handlers::jobs::list).post(handlers::jobs::create))
        .route(
            "/jobs/{id}",
            put(handlers::jobs::update).delete(handlers::jobs::delete),
        )
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
