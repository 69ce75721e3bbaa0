use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::{LootEntry, LootFilter, LootRepository, LootTotals};

use crate::utils::{current_millis, event_millis};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone)]
struct StoredLoot {
    entry: LootEntry,
    event_ms: i64,
    ingested_ms: i64,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    rows: Vec<StoredLoot>,
    next_seq: u64,
}

/// Process-local store for development and tests. Nothing survives a restart.
pub struct InMemoryRepo {
    inner: RwLock<Inner>,
    retention_days: u32,
}

impl InMemoryRepo {
    pub fn new(retention_days: u32) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            retention_days,
        }
    }

    fn cutoff_ms(&self, now_ms: i64) -> Option<i64> {
        (self.retention_days > 0).then(|| now_ms - i64::from(self.retention_days) * DAY_MS)
    }

    async fn insert_at(&self, entry: &LootEntry, ingested_ms: i64) {
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.rows.push(StoredLoot {
            entry: entry.clone(),
            event_ms: event_millis(&entry.timestamp, ingested_ms),
            ingested_ms,
            seq,
        });
        if let Some(cutoff) = self.cutoff_ms(ingested_ms) {
            inner.rows.retain(|row| row.ingested_ms >= cutoff);
        }
    }

    fn is_live(&self, row: &StoredLoot, now_ms: i64) -> bool {
        self.cutoff_ms(now_ms)
            .map_or(true, |cutoff| row.ingested_ms >= cutoff)
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl LootRepository for InMemoryRepo {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn find_duplicate(
        &self,
        timestamp: &str,
        item_name: &str,
        character: &str,
    ) -> Result<Option<String>> {
        let now = current_millis();
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|row| self.is_live(row, now))
            .find(|row| row.entry.dedup_key() == (timestamp, item_name, character))
            .map(|row| row.entry.id.clone()))
    }

    async fn insert_entry(&self, entry: &LootEntry) -> Result<()> {
        self.insert_at(entry, current_millis()).await;
        Ok(())
    }

    async fn fetch_recent(&self, filter: &LootFilter, limit: usize) -> Result<Vec<LootEntry>> {
        let now = current_millis();
        let inner = self.inner.read().await;
        let mut rows = inner
            .rows
            .iter()
            .filter(|row| self.is_live(row, now) && filter.matches(&row.entry))
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| (b.event_ms, b.seq).cmp(&(a.event_ms, a.seq)));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| row.entry.clone())
            .collect())
    }

    async fn fetch_totals(&self) -> Result<LootTotals> {
        let now = current_millis();
        let inner = self.inner.read().await;
        let mut totals = LootTotals::default();
        for row in inner.rows.iter().filter(|row| self.is_live(row, now)) {
            totals.record(row.entry.quality, 1);
        }
        Ok(totals)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
