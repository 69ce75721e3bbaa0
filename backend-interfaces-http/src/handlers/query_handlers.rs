use axum::extract::{Query, State};
use axum::Json;

use backend_application::queries::loot_queries;
use backend_application::AppState;
use backend_domain::{LootPage, LootQuery};

use crate::error::HttpError;

pub async fn list_loot(
    State(state): State<AppState>,
    Query(query): Query<LootQuery>,
) -> Result<Json<LootPage>, HttpError> {
    let page = loot_queries::list_loot(&state, query).await?;
    Ok(Json(page))
}
