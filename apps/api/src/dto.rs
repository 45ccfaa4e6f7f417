use rolegate_application::{CacheStatus, ResolvedRoles, RoleCacheStats};
use serde::Serialize;
use ts_rs::TS;

/// Error payload shared by every endpoint.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Roles granted to the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-roles-response.ts"
)]
pub struct UserRolesResponse {
    pub email: String,
    pub roles: Vec<String>,
}

impl From<ResolvedRoles> for UserRolesResponse {
    fn from(value: ResolvedRoles) -> Self {
        Self {
            email: value.subject.to_string(),
            roles: value.roles.names(),
        }
    }
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub cache_enabled: bool,
    pub cache_healthy: bool,
}

impl HealthResponse {
    #[must_use]
    pub fn from_cache_status(cache: CacheStatus) -> Self {
        Self {
            status: "healthy",
            service: "authz-service",
            version: env!("CARGO_PKG_VERSION"),
            cache_enabled: cache.enabled,
            cache_healthy: cache.healthy,
        }
    }
}

/// Result of dropping one cached role set.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cache-invalidation-response.ts"
)]
pub struct CacheInvalidationResponse {
    pub email: String,
    pub invalidated: bool,
}

/// Role cache counters since process start.
#[derive(Debug, Default, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/cache-stats-response.ts"
)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
}

impl From<RoleCacheStats> for CacheStatsResponse {
    fn from(value: RoleCacheStats) -> Self {
        Self {
            hits: value.hits,
            misses: value.misses,
            failures: value.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CacheInvalidationResponse, CacheStatsResponse, ErrorResponse, HealthResponse,
        UserRolesResponse,
    };

    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        ErrorResponse::export(&config)?;
        UserRolesResponse::export(&config)?;
        HealthResponse::export(&config)?;
        CacheInvalidationResponse::export(&config)?;
        CacheStatsResponse::export(&config)?;

        Ok(())
    }
}
