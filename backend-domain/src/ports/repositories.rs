use async_trait::async_trait;

use crate::entities::{LootEntry, LootFilter, LootTotals};

#[async_trait]
pub trait LootRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    /// Id of a stored entry with the same timestamp, item name and character.
    async fn find_duplicate(
        &self,
        timestamp: &str,
        item_name: &str,
        character: &str,
    ) -> anyhow::Result<Option<String>>;
    async fn insert_entry(&self, entry: &LootEntry) -> anyhow::Result<()>;
    /// Newest first by event time, filters applied before the limit.
    async fn fetch_recent(
        &self,
        filter: &LootFilter,
        limit: usize,
    ) -> anyhow::Result<Vec<LootEntry>>;
    /// Counts over every live entry, ignoring any filter.
    async fn fetch_totals(&self) -> anyhow::Result<LootTotals>;
    async fn ping(&self) -> anyhow::Result<()>;
}
