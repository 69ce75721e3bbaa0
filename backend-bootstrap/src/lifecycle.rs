use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use backend_application::AppState;
use backend_infrastructure::AppConfig;
use backend_interfaces_http::build_router;

use crate::context::AppContext;

pub fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_standalone(config: AppConfig) -> Result<()> {
    let context = AppContext::new(&config).await?;
    let state = context.state;

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use async_trait::async_trait;
    use backend_application::{LootStreamHub, Metrics};
    use backend_domain::ports::BroadcastService;
    use backend_domain::{LootEntry, LootFilter, LootRepository, RuntimeConfig};
    use backend_infrastructure::{InMemoryRepo, NoopBroadcastService};

    struct StalledBroadcaster;

    #[async_trait]
    impl BroadcastService for StalledBroadcaster {
        async fn publish(&self, _event: &str, _entry: &LootEntry) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    fn state(max_body_bytes: u64) -> AppState {
        AppState {
            config: RuntimeConfig {
                max_body_bytes,
                ..Default::default()
            },
            loot_repo: Arc::new(InMemoryRepo::default()),
            broadcaster: Arc::new(NoopBroadcastService),
            stream_hub: Arc::new(LootStreamHub::default()),
            metrics: Arc::new(Metrics::default()),
        }
    }

    #[tokio::test]
    async fn stalled_pubsub_does_not_time_out_ingest() {
        let repo = Arc::new(InMemoryRepo::default());
        let state = AppState {
            config: RuntimeConfig {
                request_timeout_seconds: 1,
                ..Default::default()
            },
            loot_repo: repo.clone(),
            broadcaster: Arc::new(StalledBroadcaster),
            stream_hub: Arc::new(LootStreamHub::default()),
            metrics: Arc::new(Metrics::default()),
        };
        let app = build_router_with_layers(state);
        let request = Request::builder()
            .method("POST")
            .uri("/api/loot")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"itemName":"Shako","quality":"unique"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let stored = repo.fetch_recent(&LootFilter::default(), 10).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router_with_layers(state(16));
        let request = Request::builder()
            .method("POST")
            .uri("/api/loot")
            .body(Body::from(
                r#"{"itemName":"The Stone of Jordan","quality":"unique"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn layered_router_serves_health() {
        let app = build_router_with_layers(state(1024));
        let request = Request::builder()
            .uri("/api/health/live")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
