use anyhow::Result;
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use backend_domain::{DbConfig, LootEntry, LootFilter, LootRepository, LootTotals, Quality};

use crate::utils::{current_millis, event_millis, millis_to_utc};

const TABLE: &str = "loot_entries";

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct LootEntryRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub event_time: OffsetDateTime,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub ingested_at: OffsetDateTime,
    pub id: String,
    pub timestamp: String,
    pub character: String,
    pub character_class: String,
    pub level: Option<u32>,
    pub difficulty: String,
    pub item_name: String,
    pub item_id: String,
    pub quality: String,
    pub location: String,
    pub dropped_by: String,
    pub stats: Vec<String>,
}

impl LootEntryRow {
    pub fn from_entry(entry: &LootEntry, ingested_at_ms: i64) -> Self {
        Self {
            event_time: millis_to_utc(event_millis(&entry.timestamp, ingested_at_ms)),
            ingested_at: millis_to_utc(ingested_at_ms),
            id: entry.id.clone(),
            timestamp: entry.timestamp.clone(),
            character: entry.character.clone(),
            character_class: entry.character_class.clone().unwrap_or_default(),
            level: entry.level,
            difficulty: entry.difficulty.clone().unwrap_or_default(),
            item_name: entry.item_name.clone(),
            item_id: entry.item_id.clone(),
            quality: entry.quality.as_str().to_string(),
            location: entry.location.clone(),
            dropped_by: entry.dropped_by.clone(),
            stats: entry.stats.clone(),
        }
    }

    pub fn into_entry(self) -> LootEntry {
        LootEntry {
            id: self.id,
            timestamp: self.timestamp,
            character: self.character,
            character_class: Some(self.character_class).filter(|value| !value.is_empty()),
            level: self.level,
            difficulty: Some(self.difficulty).filter(|value| !value.is_empty()),
            item_name: self.item_name,
            item_id: self.item_id,
            quality: Quality::from(self.quality.as_str()),
            location: self.location,
            dropped_by: self.dropped_by,
            stats: self.stats,
        }
    }
}

#[derive(Clone)]
pub struct ClickhouseRepo {
    client: Client,
    database: String,
    retention_days: u32,
}

impl ClickhouseRepo {
    pub fn new(client: Client, database: String, retention_days: u32) -> Self {
        Self {
            client,
            database,
            retention_days,
        }
    }

    pub fn from_config(config: &DbConfig) -> Self {
        let mut client = Client::default()
            .with_url(&config.clickhouse_url)
            .with_database(&config.clickhouse_database);
        if let Some(user) = &config.clickhouse_user {
            client = client.with_user(user);
        }
        if let Some(password) = &config.clickhouse_password {
            client = client.with_password(password);
        }
        Self::new(
            client,
            config.clickhouse_database.clone(),
            config.retention_days,
        )
    }

    fn live_clause(&self) -> String {
        live_clause(self.retention_days)
    }
}

pub fn create_table_sql(retention_days: u32) -> String {
    let ttl = if retention_days > 0 {
        format!(
            "\nTTL toDateTime(ingested_at) + INTERVAL {} DAY",
            retention_days
        )
    } else {
        String::new()
    };
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {TABLE} (
    event_time DateTime64(3),
    ingested_at DateTime64(3),
    id String,
    timestamp String,
    character String,
    character_class String,
    level Nullable(UInt32),
    difficulty String,
    item_name String,
    item_id String,
    quality String,
    location String,
    dropped_by String,
    stats Array(String)
) ENGINE = MergeTree
PARTITION BY toYYYYMM(ingested_at)
ORDER BY (event_time, character, item_name){ttl}
"#
    )
}

/// TTL merges are lazy; reads filter expired rows themselves.
fn live_clause(retention_days: u32) -> String {
    if retention_days == 0 {
        "1 = 1".to_string()
    } else {
        format!(
            "ingested_at >= now64(3) - INTERVAL {} DAY",
            retention_days
        )
    }
}

#[async_trait]
impl LootRepository for ClickhouseRepo {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;
        self.client
            .query(&create_table_sql(self.retention_days))
            .execute()
            .await?;
        info!(
            database = %self.database,
            retention_days = self.retention_days,
            "clickhouse schema ready"
        );
        Ok(())
    }

    async fn find_duplicate(
        &self,
        timestamp: &str,
        item_name: &str,
        character: &str,
    ) -> Result<Option<String>> {
        let sql = format!(
            "SELECT id FROM {TABLE} WHERE timestamp = ? AND item_name = ? AND character = ? AND {} LIMIT 1",
            self.live_clause()
        );
        let ids = self
            .client
            .query(&sql)
            .bind(timestamp)
            .bind(item_name)
            .bind(character)
            .fetch_all::<String>()
            .await?;
        Ok(ids.into_iter().next())
    }

    async fn insert_entry(&self, entry: &LootEntry) -> Result<()> {
        let mut insert = self.client.insert(TABLE)?;
        insert
            .write(&LootEntryRow::from_entry(entry, current_millis()))
            .await?;
        insert.end().await?;
        Ok(())
    }

    async fn fetch_recent(&self, filter: &LootFilter, limit: usize) -> Result<Vec<LootEntry>> {
        let mut sql = format!("SELECT ?fields FROM {TABLE} WHERE {}", self.live_clause());
        if filter.quality.is_some() {
            sql.push_str(" AND quality = ?");
        }
        if filter.character.is_some() {
            sql.push_str(" AND character = ?");
        }
        sql.push_str(" ORDER BY event_time DESC, ingested_at DESC LIMIT ?");

        let mut query = self.client.query(&sql);
        if let Some(quality) = filter.quality {
            query = query.bind(quality.as_str());
        }
        if let Some(character) = &filter.character {
            query = query.bind(character.as_str());
        }
        let rows = query
            .bind(limit as u64)
            .fetch_all::<LootEntryRow>()
            .await?;
        Ok(rows.into_iter().map(LootEntryRow::into_entry).collect())
    }

    async fn fetch_totals(&self) -> Result<LootTotals> {
        let sql = format!(
            "SELECT quality, count() AS cnt FROM {TABLE} WHERE {} GROUP BY quality",
            self.live_clause()
        );
        let rows = self.client.query(&sql).fetch_all::<(String, u64)>().await?;
        let mut totals = LootTotals::default();
        for (quality, count) in rows {
            totals.record(Quality::from(quality.as_str()), count);
        }
        Ok(totals)
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LootEntry {
        LootEntry {
            id: "1-abc".to_string(),
            timestamp: "2025-10-15T10:00:00Z".to_string(),
            character: "Bob".to_string(),
            character_class: None,
            level: Some(90),
            difficulty: Some("Hell".to_string()),
            item_name: "Shako".to_string(),
            item_id: "".to_string(),
            quality: Quality::Unique,
            location: "Durance of Hate Level 3".to_string(),
            dropped_by: "Mephisto".to_string(),
            stats: vec!["+2 to All Skills".to_string()],
        }
    }

    #[test]
    fn row_conversion_preserves_entry() {
        let row = LootEntryRow::from_entry(&entry(), 0);
        assert_eq!(row.character_class, "");
        assert_eq!(row.quality, "unique");
        assert_eq!(
            row.event_time.unix_timestamp(),
            1_760_522_400,
            "event time comes from the client timestamp"
        );
        assert_eq!(row.into_entry(), entry());
    }

    #[test]
    fn ttl_only_when_retention_is_set() {
        assert!(create_table_sql(7).contains("TTL toDateTime(ingested_at) + INTERVAL 7 DAY"));
        assert!(!create_table_sql(0).contains("TTL"));
        assert_eq!(live_clause(0), "1 = 1");
        assert!(live_clause(3).contains("INTERVAL 3 DAY"));
    }
}
