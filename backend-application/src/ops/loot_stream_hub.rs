use backend_domain::LootEntry;
use tokio::sync::broadcast;

const CHANNEL_BUFFER: usize = 64;

/// In-process fan-out of newly stored entries to push subscribers.
pub struct LootStreamHub {
    tx: broadcast::Sender<LootEntry>,
}

impl Default for LootStreamHub {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_BUFFER);
        Self { tx }
    }
}

impl LootStreamHub {
    pub fn subscribe(&self) -> broadcast::Receiver<LootEntry> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers reached; zero when nobody listens.
    pub fn publish(&self, entry: &LootEntry) -> usize {
        self.tx.send(entry.clone()).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
