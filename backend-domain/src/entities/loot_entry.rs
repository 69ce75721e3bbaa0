// Loot entry entity
// One recorded item-drop event, immutable once stored

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::format_timestamp;
use crate::value_objects::{LootId, Quality};

pub const DEFAULT_CHARACTER: &str = "Unknown";
pub const DEFAULT_ITEM_NAME: &str = "Unknown Item";
pub const DEFAULT_LOCATION: &str = "Unknown";

/// Name of the broadcast event carrying a freshly stored entry.
pub const NEW_LOOT_EVENT: &str = "new-loot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootEntry {
    pub id: String,
    pub timestamp: String,
    pub character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub item_name: String,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub dropped_by: String,
    #[serde(default)]
    pub stats: Vec<String>,
}

/// Raw webhook body. Every field is optional; see `LootEntry::from_submission`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootSubmission {
    pub timestamp: Option<String>,
    pub character: Option<String>,
    pub character_class: Option<String>,
    /// Optional detail: a value that is not a level is dropped, not rejected.
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Option<u32>,
    pub difficulty: Option<String>,
    pub item_name: Option<String>,
    pub item_id: Option<String>,
    pub quality: Option<String>,
    pub location: Option<String>,
    pub dropped_by: Option<String>,
    pub stats: Option<Vec<String>>,
}

impl LootEntry {
    pub fn from_submission(submission: LootSubmission, id: LootId, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into_inner(),
            timestamp: non_blank(submission.timestamp).unwrap_or_else(|| format_timestamp(now)),
            character: non_blank(submission.character)
                .unwrap_or_else(|| DEFAULT_CHARACTER.to_string()),
            character_class: non_blank(submission.character_class),
            level: submission.level,
            difficulty: non_blank(submission.difficulty),
            item_name: non_blank(submission.item_name)
                .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
            item_id: non_blank(submission.item_id).unwrap_or_default(),
            quality: submission
                .quality
                .as_deref()
                .map(Quality::from)
                .unwrap_or_default(),
            location: non_blank(submission.location)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            dropped_by: non_blank(submission.dropped_by).unwrap_or_default(),
            stats: submission
                .stats
                .unwrap_or_default()
                .into_iter()
                .map(|stat| stat.trim().to_string())
                .filter(|stat| !stat.is_empty())
                .collect(),
        }
    }

    /// Key used to detect a resubmitted drop.
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.timestamp, &self.item_name, &self.character)
    }
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLevel {
        Number(i64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<RawLevel>::deserialize(deserializer)? {
        Some(RawLevel::Number(level)) => u32::try_from(level).ok(),
        Some(RawLevel::Text(text)) => text.trim().parse().ok(),
        Some(RawLevel::Other(_)) | None => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub id: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Created { id: String },
    Duplicate { id: String },
}

impl IngestOutcome {
    pub fn into_response(self) -> IngestResponse {
        match self {
            IngestOutcome::Created { id } => IngestResponse {
                success: true,
                id,
                duplicate: false,
            },
            IngestOutcome::Duplicate { id } => IngestResponse {
                success: true,
                id,
                duplicate: true,
            },
        }
    }
}
