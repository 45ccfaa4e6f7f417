use axum::Router;
use axum::routing::{delete, get};
use tower_http::trace::TraceLayer;

use crate::handlers::{cache, health, roles};
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/authz/admin/cache/stats", get(cache::cache_stats_handler))
        .route(
            "/authz/admin/cache/{email}",
            delete(cache::invalidate_cache_handler),
        );

    Router::new()
        .route("/authz/health", get(health::health_handler))
        .route(
            "/authz/roles",
            get(roles::role_headers_handler).post(roles::role_headers_handler),
        )
        .route(
            "/authz/roles/{*path}",
            get(roles::role_headers_for_path_handler).post(roles::role_headers_for_path_handler),
        )
        .route("/auth/me", get(roles::me_handler))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
