use axum::Json;
use axum::extract::{Path, State};
use rolegate_core::SubjectEmail;

use crate::dto::{CacheInvalidationResponse, CacheStatsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<CacheInvalidationResponse>> {
    let subject = SubjectEmail::new(&email)?;
    let invalidated = state
        .role_lookup_service
        .invalidate(subject.as_str())
        .await?;

    Ok(Json(CacheInvalidationResponse {
        email: subject.to_string(),
        invalidated,
    }))
}

pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(
        state
            .role_lookup_service
            .cache_stats()
            .map(CacheStatsResponse::from)
            .unwrap_or_default(),
    )
}
