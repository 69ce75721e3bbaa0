use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{ingest_handlers, ops_handlers, query_handlers, stream_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/loot",
            post(ingest_handlers::ingest_loot).get(query_handlers::list_loot),
        )
        .route("/api/loot/stream", get(stream_handlers::stream_loot))
        .route("/api/health/live", get(ops_handlers::health_live))
        .route("/api/health/ready", get(ops_handlers::health_ready))
        .route("/api/metrics", get(ops_handlers::metrics_prometheus))
        .with_state(state)
}
