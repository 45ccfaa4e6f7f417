use axum::Json;
use axum::extract::State;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Liveness endpoint. Always 200; cache reachability is reported, not enforced.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_status = state.role_lookup_service.cache_status().await;
    Json(HealthResponse::from_cache_status(cache_status))
}
