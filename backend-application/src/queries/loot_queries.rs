use tracing::error;

use crate::{AppError, AppState};
use backend_domain::{
    LootFilter, LootPage, LootQuery, Quality, DEFAULT_LOOT_LIMIT, MAX_LOOT_LIMIT,
};

pub async fn list_loot(state: &AppState, query: LootQuery) -> Result<LootPage, AppError> {
    state.metrics.record_query();
    let limit = resolve_limit(query.limit.as_deref())?;
    let filter = resolve_filter(query.category.as_deref(), query.character.as_deref())?;

    let logs = state
        .loot_repo
        .fetch_recent(&filter, limit)
        .await
        .map_err(|err| {
            error!("failed to fetch loot entries: {:#}", err);
            AppError::storage("failed to fetch loot entries", err)
        })?;
    let totals = state.loot_repo.fetch_totals().await.map_err(|err| {
        error!("failed to compute loot totals: {:#}", err);
        AppError::storage("failed to compute loot totals", err)
    })?;

    Ok(LootPage { logs, totals })
}

/// Missing or blank means the default. Out-of-range numbers are clamped.
pub fn resolve_limit(raw: Option<&str>) -> Result<usize, AppError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(DEFAULT_LOOT_LIMIT);
    };
    let requested: i64 = value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid limit '{}'", value)))?;
    Ok(requested.clamp(1, MAX_LOOT_LIMIT as i64) as usize)
}

pub fn resolve_filter(
    category: Option<&str>,
    character: Option<&str>,
) -> Result<LootFilter, AppError> {
    let quality = match category.map(str::trim) {
        None | Some("") => None,
        Some(value) if value.eq_ignore_ascii_case("all") => None,
        Some(value) => Some(
            Quality::parse(value)
                .ok_or_else(|| AppError::BadRequest(format!("unknown category '{}'", value)))?,
        ),
    };
    let character = character
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);
    Ok(LootFilter { quality, character })
}
