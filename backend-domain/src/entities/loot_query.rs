// Loot query entities

use serde::{Deserialize, Serialize};

use crate::entities::LootEntry;
use crate::value_objects::Quality;

pub const DEFAULT_LOOT_LIMIT: usize = 50;
pub const MAX_LOOT_LIMIT: usize = 100;

/// Query string of `GET /api/loot`. `limit` stays raw so a malformed value
/// is reported like every other bad request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LootQuery {
    pub limit: Option<String>,
    pub category: Option<String>,
    pub character: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LootFilter {
    pub quality: Option<Quality>,
    pub character: Option<String>,
}

impl LootFilter {
    pub fn matches(&self, entry: &LootEntry) -> bool {
        if let Some(quality) = self.quality {
            if entry.quality != quality {
                return false;
            }
        }
        if let Some(character) = &self.character {
            if &entry.character != character {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootTotals {
    pub total: u64,
    pub uniques: u64,
    pub sets: u64,
    pub runes: u64,
    #[serde(default)]
    pub rares: u64,
    #[serde(default)]
    pub magics: u64,
}

impl LootTotals {
    pub fn record(&mut self, quality: Quality, count: u64) {
        self.total += count;
        match quality {
            Quality::Unique => self.uniques += count,
            Quality::Set => self.sets += count,
            Quality::Rune => self.runes += count,
            Quality::Rare => self.rares += count,
            Quality::Magic => self.magics += count,
            Quality::Normal => {}
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LootPage {
    pub logs: Vec<LootEntry>,
    pub totals: LootTotals,
}
