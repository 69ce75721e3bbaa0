use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::warn;

use backend_application::commands::ingest_commands;
use backend_application::AppState;
use backend_domain::{IngestOutcome, IngestResponse};

use crate::error::HttpError;
use crate::middleware::{authorize_webhook, parse_submission};

pub async fn ingest_loot(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<IngestResponse>), HttpError> {
    if !authorize_webhook(&state.config, &headers) {
        warn!("rejected loot webhook with missing or wrong secret");
        return Err(HttpError::Unauthorized);
    }

    let submission = parse_submission(&headers, &body).map_err(|err| {
        warn!("failed to parse loot body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;

    let outcome = ingest_commands::ingest_loot(&state, submission).await?;
    let status = match outcome {
        IngestOutcome::Created { .. } => StatusCode::CREATED,
        IngestOutcome::Duplicate { .. } => StatusCode::OK,
    };
    Ok((status, Json(outcome.into_response())))
}
