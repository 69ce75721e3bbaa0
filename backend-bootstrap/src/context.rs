use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::{AppState, LootStreamHub, Metrics};
use backend_domain::ports::{BroadcastService, LootRepository};
use backend_domain::{DbConfig, RuntimeConfig, StorageBackend};
use backend_infrastructure::{
    AppConfig, ClickhouseRepo, HttpBroadcastService, InMemoryRepo, NoopBroadcastService,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config()?;

        let loot_repo = build_repository(&db_config);
        loot_repo.ensure_schema().await?;
        let broadcaster = build_broadcaster(&runtime_config)?;

        let state = AppState {
            config: runtime_config,
            loot_repo,
            broadcaster,
            stream_hub: Arc::new(LootStreamHub::default()),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}

fn build_repository(db_config: &DbConfig) -> Arc<dyn LootRepository> {
    match db_config.storage_backend {
        StorageBackend::Clickhouse => {
            info!(url = %db_config.clickhouse_url, "using clickhouse storage");
            Arc::new(ClickhouseRepo::from_config(db_config))
        }
        StorageBackend::Memory => {
            info!("using in-memory storage; entries are lost on restart");
            Arc::new(InMemoryRepo::new(db_config.retention_days))
        }
    }
}

fn build_broadcaster(config: &RuntimeConfig) -> Result<Arc<dyn BroadcastService>> {
    match HttpBroadcastService::from_config(config)? {
        Some(service) => {
            info!(channel = %config.broadcast_channel, "broadcasting valuable loot");
            Ok(Arc::new(service))
        }
        None => {
            info!("broadcast_url not set; external broadcasting disabled");
            Ok(Arc::new(NoopBroadcastService))
        }
    }
}
