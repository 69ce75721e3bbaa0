// Terminal rendering of the dashboard

use std::fmt::Write;

use chrono::{Local, TimeZone};

use backend_domain::{parse_timestamp_millis, LootEntry, LootTotals};

use crate::metadata::image_url;
use crate::state::{DashboardState, ModalState};

const CARD_STATS: usize = 3;

pub fn render_dashboard(state: &DashboardState) -> String {
    let mut out = String::new();
    let updated = state
        .last_update()
        .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(
        out,
        "Loot Feed  [{}]  updated {}",
        state.category().label(),
        updated
    );
    let _ = writeln!(out, "{}", render_totals(state.totals()));
    out.push('\n');

    let columns = state.columns();
    if columns.is_empty() {
        let message = if state.is_loading() {
            "Loading..."
        } else {
            "No loot yet."
        };
        let _ = writeln!(out, "{}", message);
        return out;
    }

    for column in columns {
        let _ = writeln!(out, "== {} ({}) ==", column.character, column.entries.len());
        for entry in column.entries {
            out.push_str(&render_card(entry));
        }
        out.push('\n');
    }
    if state.has_more() {
        let _ = writeln!(
            out,
            "... more entries available (showing {})",
            state.visible_entries().len()
        );
    }
    out
}

pub fn render_totals(totals: &LootTotals) -> String {
    format!(
        "Total {} | Uniques {} | Sets {} | Runes {} | Rares {} | Magic {}",
        totals.total, totals.uniques, totals.sets, totals.runes, totals.rares, totals.magics
    )
}

pub fn render_card(entry: &LootEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {} [{}]", entry.item_name, entry.quality.label());
    let _ = writeln!(
        out,
        "    {} | {} | {}",
        entry.location,
        dash_if_empty(&entry.dropped_by),
        format_time(&entry.timestamp)
    );
    for stat in entry.stats.iter().take(CARD_STATS) {
        let _ = writeln!(out, "    - {}", stat);
    }
    if entry.stats.len() > CARD_STATS {
        let _ = writeln!(out, "    +{} more...", entry.stats.len() - CARD_STATS);
    }
    out
}

pub fn render_detail(modal: &ModalState, metadata_base: &str) -> String {
    let Some(entry) = modal.entry() else {
        return String::new();
    };
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", entry.item_name, entry.quality.label());
    let _ = writeln!(out, "id:         {}", entry.id);
    let _ = writeln!(out, "character:  {}", describe_character(entry));
    if let Some(difficulty) = &entry.difficulty {
        let _ = writeln!(out, "difficulty: {}", difficulty);
    }
    let _ = writeln!(out, "location:   {}", entry.location);
    let _ = writeln!(out, "dropped by: {}", dash_if_empty(&entry.dropped_by));
    let _ = writeln!(out, "time:       {}", format_time(&entry.timestamp));
    if !entry.stats.is_empty() {
        let _ = writeln!(out, "stats:");
        for stat in &entry.stats {
            let _ = writeln!(out, "  - {}", stat);
        }
    }

    match modal {
        ModalState::Loading(_) => {
            let _ = writeln!(out, "\nLoading item details...");
        }
        ModalState::Unavailable(_) => {
            let _ = writeln!(out, "\nItem details unavailable.");
        }
        ModalState::Loaded(_, details) => {
            out.push('\n');
            if let Some(item_type) = &details.item_type {
                let _ = writeln!(out, "type:       {}", item_type);
            }
            if let Some(base_item) = &details.base_item {
                let _ = writeln!(out, "base item:  {}", base_item);
            }
            if let Some(level) = details.properties.required_level {
                let _ = writeln!(out, "required level: {}", level);
            }
            if let Some(defense) = &details.properties.defense {
                let _ = writeln!(out, "defense:    {}", defense);
            }
            if !details.properties.damage.is_empty() {
                let _ = writeln!(out, "damage:     {}", details.properties.damage.join(", "));
            }
            if !details.properties.magical_properties.is_empty() {
                let _ = writeln!(out, "properties:");
                for property in &details.properties.magical_properties {
                    let _ = writeln!(out, "  * {}", property);
                }
            }
            let _ = writeln!(out, "image:      {}", image_url(metadata_base, details));
        }
        ModalState::Closed => {}
    }
    out
}

/// Local wall-clock time, or the raw string when it does not parse.
pub fn format_time(timestamp: &str) -> String {
    parse_timestamp_millis(timestamp)
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn describe_character(entry: &LootEntry) -> String {
    let mut description = entry.character.clone();
    match (&entry.character_class, entry.level) {
        (Some(class), Some(level)) => {
            let _ = write!(description, " ({} {})", class, level);
        }
        (Some(class), None) => {
            let _ = write!(description, " ({})", class);
        }
        (None, Some(level)) => {
            let _ = write!(description, " (level {})", level);
        }
        (None, None) => {}
    }
    description
}

fn dash_if_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ItemMetadata, ItemProperties};
    use backend_domain::{LootPage, Quality};
    use chrono::Utc;

    fn entry(stats: usize) -> LootEntry {
        LootEntry {
            id: "1-abc".to_string(),
            timestamp: "sometime".to_string(),
            character: "Bob".to_string(),
            character_class: Some("Sorceress".to_string()),
            level: Some(85),
            difficulty: None,
            item_name: "Harlequin Crest".to_string(),
            item_id: "shako".to_string(),
            quality: Quality::Unique,
            location: "Durance of Hate".to_string(),
            dropped_by: String::new(),
            stats: (1..=stats).map(|n| format!("stat {n}")).collect(),
        }
    }

    #[test]
    fn card_shows_three_stats_and_remainder() {
        let card = render_card(&entry(5));
        assert!(card.contains("Harlequin Crest [Unique]"));
        assert!(card.contains("Durance of Hate | - | sometime"));
        assert!(card.contains("stat 3"));
        assert!(!card.contains("stat 4"));
        assert!(card.contains("+2 more..."));
        assert!(!render_card(&entry(3)).contains("more..."));
    }

    #[test]
    fn dashboard_groups_cards_by_character() {
        let mut state = DashboardState::default();
        assert!(render_dashboard(&state).contains("Loading..."));

        state.replace(
            LootPage {
                logs: vec![entry(0)],
                totals: LootTotals {
                    total: 1,
                    uniques: 1,
                    ..Default::default()
                },
            },
            Utc::now(),
        );
        let text = render_dashboard(&state);
        assert!(text.contains("[All Items]"));
        assert!(text.contains("Total 1 | Uniques 1"));
        assert!(text.contains("== Bob (1) =="));
    }

    #[test]
    fn detail_degrades_without_metadata() {
        let text = render_detail(&ModalState::Unavailable(entry(4)), "https://items.example");
        assert!(text.contains("Bob (Sorceress 85)"));
        assert!(text.contains("stat 4"));
        assert!(text.contains("Item details unavailable."));
        assert!(!text.contains("image:"));
    }

    #[test]
    fn detail_lists_metadata_properties() {
        let details = ItemMetadata {
            name: "Harlequin Crest".to_string(),
            item_type: Some("Helm".to_string()),
            properties: ItemProperties {
                magical_properties: vec!["+2 to All Skills".to_string()],
                required_level: Some(62),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = render_detail(
            &ModalState::Loaded(entry(0), details),
            "https://items.example",
        );
        assert!(text.contains("type:       Helm"));
        assert!(text.contains("required level: 62"));
        assert!(text.contains("* +2 to All Skills"));
        assert!(text.contains("https://items.example/images/items/harlequin-crest.png"));
    }
}
