use std::fmt;
use std::str::FromStr;

use backend_domain::{LootEntry, Quality};

/// Item-name substrings hidden from every view, whatever the server returns.
pub const EXCLUDED_ITEM_TERMS: [&str; 6] = ["potion", "gold", "key", "scroll", "arrows", "bolts"];

pub fn is_excluded(item_name: &str) -> bool {
    let name = item_name.to_lowercase();
    EXCLUDED_ITEM_TERMS.iter().any(|term| name.contains(term))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Quality),
}

impl CategoryFilter {
    pub const OPTIONS: [CategoryFilter; 6] = [
        CategoryFilter::All,
        CategoryFilter::Only(Quality::Unique),
        CategoryFilter::Only(Quality::Set),
        CategoryFilter::Only(Quality::Rare),
        CategoryFilter::Only(Quality::Magic),
        CategoryFilter::Only(Quality::Rune),
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        Quality::parse(value).map(CategoryFilter::Only)
    }

    /// Value for the `category` query parameter; `None` means unfiltered.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(quality) => Some(quality.as_str()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All Items",
            CategoryFilter::Only(Quality::Unique) => "Uniques",
            CategoryFilter::Only(Quality::Set) => "Sets",
            CategoryFilter::Only(Quality::Rare) => "Rares",
            CategoryFilter::Only(Quality::Magic) => "Magic",
            CategoryFilter::Only(Quality::Rune) => "Runes",
            CategoryFilter::Only(Quality::Normal) => "Normal",
        }
    }

    pub fn matches(&self, entry: &LootEntry) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(quality) => entry.quality == *quality,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryFilter::parse(s).ok_or_else(|| {
            format!("unknown category '{s}' (expected all, unique, set, rare, magic, rune or normal)")
        })
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query().unwrap_or("all"))
    }
}
