use std::sync::Arc;

use backend_domain::ports::{BroadcastService, LootRepository};
use backend_domain::RuntimeConfig;

use crate::{LootStreamHub, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub loot_repo: Arc<dyn LootRepository>,
    pub broadcaster: Arc<dyn BroadcastService>,
    pub stream_hub: Arc<LootStreamHub>,
    pub metrics: Arc<Metrics>,
}
