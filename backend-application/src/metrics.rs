use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_requests: AtomicU64,
    entries_created: AtomicU64,
    duplicates: AtomicU64,
    ingest_errors: AtomicU64,
    broadcasts: AtomicU64,
    broadcast_failures: AtomicU64,
    queries: AtomicU64,
}

impl Metrics {
    pub fn record_ingest_request(&self) {
        self.ingest_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_created(&self) {
        self.entries_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest_error(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self, ok: bool) {
        if ok {
            self.broadcasts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.broadcast_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("lootfeed_ingest_requests_total", &self.ingest_requests),
            ("lootfeed_entries_created_total", &self.entries_created),
            ("lootfeed_duplicates_total", &self.duplicates),
            ("lootfeed_ingest_errors_total", &self.ingest_errors),
            ("lootfeed_broadcasts_total", &self.broadcasts),
            ("lootfeed_broadcast_failures_total", &self.broadcast_failures),
            ("lootfeed_queries_total", &self.queries),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {name} counter\n{name} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}
