use time::OffsetDateTime;

use backend_domain::parse_timestamp_millis;

pub fn millis_to_utc(ms: i64) -> OffsetDateTime {
    let nanos = i128::from(ms).saturating_mul(1_000_000);
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn current_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Ordering time of an entry: its parsed timestamp, else the ingest time.
pub fn event_millis(timestamp: &str, ingested_at_ms: i64) -> i64 {
    parse_timestamp_millis(timestamp).unwrap_or(ingested_at_ms)
}
