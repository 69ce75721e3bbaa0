use async_trait::async_trait;

use crate::entities::LootEntry;

/// Publishes stored entries to the external pub/sub channel.
#[async_trait]
pub trait BroadcastService: Send + Sync {
    async fn publish(&self, event: &str, entry: &LootEntry) -> anyhow::Result<()>;
    fn is_enabled(&self) -> bool;
}
