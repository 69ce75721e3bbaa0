// Item quality value object

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Normal,
    Magic,
    Rare,
    Set,
    Unique,
    Rune,
}

impl Quality {
    pub const ALL: [Quality; 6] = [
        Quality::Unique,
        Quality::Set,
        Quality::Rare,
        Quality::Magic,
        Quality::Rune,
        Quality::Normal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Normal => "normal",
            Quality::Magic => "magic",
            Quality::Rare => "rare",
            Quality::Set => "set",
            Quality::Unique => "unique",
            Quality::Rune => "rune",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Normal => "Normal",
            Quality::Magic => "Magic",
            Quality::Rare => "Rare",
            Quality::Set => "Set",
            Quality::Unique => "Unique",
            Quality::Rune => "Rune",
        }
    }

    /// Qualities eligible for real-time broadcast.
    pub fn is_valuable(&self) -> bool {
        !matches!(self, Quality::Normal)
    }

    /// Strict parse, `None` for anything outside the fixed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Quality::Normal),
            "magic" => Some(Quality::Magic),
            "rare" => Some(Quality::Rare),
            "set" => Some(Quality::Set),
            "unique" => Some(Quality::Unique),
            "rune" => Some(Quality::Rune),
            _ => None,
        }
    }
}

impl From<&str> for Quality {
    fn from(s: &str) -> Self {
        Quality::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Quality::from(raw.as_str()))
    }
}
