use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::{AppState, LootStreamHub, Metrics};
use backend_domain::ports::{BroadcastService, LootRepository};
use backend_domain::{parse_timestamp_millis, LootEntry, LootFilter, LootTotals, RuntimeConfig};

#[derive(Default)]
pub struct FakeRepo {
    entries: Mutex<Vec<LootEntry>>,
    failing: bool,
}

impl FakeRepo {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn entries(&self) -> Vec<LootEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(anyhow!("storage offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl LootRepository for FakeRepo {
    async fn ensure_schema(&self) -> Result<()> {
        self.check()
    }

    async fn find_duplicate(
        &self,
        timestamp: &str,
        item_name: &str,
        character: &str,
    ) -> Result<Option<String>> {
        self.check()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.dedup_key() == (timestamp, item_name, character))
            .map(|entry| entry.id.clone()))
    }

    async fn insert_entry(&self, entry: &LootEntry) -> Result<()> {
        self.check()?;
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn fetch_recent(&self, filter: &LootFilter, limit: usize) -> Result<Vec<LootEntry>> {
        self.check()?;
        let mut rows = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter(|(_, entry)| filter.matches(entry))
            .map(|(seq, entry)| {
                let at = parse_timestamp_millis(&entry.timestamp).unwrap_or(i64::MIN);
                (at, seq, entry.clone())
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        Ok(rows.into_iter().take(limit).map(|(_, _, entry)| entry).collect())
    }

    async fn fetch_totals(&self) -> Result<LootTotals> {
        self.check()?;
        let mut totals = LootTotals::default();
        for entry in self.entries.lock().unwrap().iter() {
            totals.record(entry.quality, 1);
        }
        Ok(totals)
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

#[derive(Default)]
pub struct RecordingBroadcaster {
    published: Mutex<Vec<(String, LootEntry)>>,
    failing: bool,
    hanging: bool,
}

impl RecordingBroadcaster {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hanging: true,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<(String, LootEntry)> {
        self.published.lock().unwrap().clone()
    }

    /// Publishing runs on a spawned task; wait until `count` messages arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<(String, LootEntry)> {
        eventually(|| self.published.lock().unwrap().len() >= count).await;
        self.published()
    }
}

pub async fn eventually(check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 2s");
}

#[async_trait]
impl BroadcastService for RecordingBroadcaster {
    async fn publish(&self, event: &str, entry: &LootEntry) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((event.to_string(), entry.clone()));
        if self.hanging {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.failing {
            return Err(anyhow!("pub/sub unreachable"));
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

pub fn test_state(
    repo: Arc<dyn LootRepository>,
    broadcaster: Arc<dyn BroadcastService>,
) -> AppState {
    AppState {
        config: RuntimeConfig::default(),
        loot_repo: repo,
        broadcaster,
        stream_hub: Arc::new(LootStreamHub::default()),
        metrics: Arc::new(Metrics::default()),
    }
}
