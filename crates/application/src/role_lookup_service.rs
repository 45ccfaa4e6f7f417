use std::sync::Arc;
use std::time::Duration;

use rolegate_core::{AppError, AppResult, AuthenticatedRequestContext, SubjectEmail};
use rolegate_domain::RoleSet;
use tracing::{error, info, warn};

use crate::{RoleCache, RoleCacheStats, RoleStore};

/// Default role cache ttl.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default budget for one role store query.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Tunables for the role lookup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleLookupConfig {
    /// Lifetime of a cached role set.
    pub cache_ttl: Duration,
    /// Upper bound for one role store query; exceeding it is a store failure.
    pub store_timeout: Duration,
}

impl Default for RoleLookupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Where a resolved role set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    /// Served from the role cache.
    Cache,
    /// Read from the authoritative role store.
    Store,
}

impl RoleSource {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
        }
    }
}

/// Role set resolved for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoles {
    /// Normalized subject the roles belong to.
    pub subject: SubjectEmail,
    /// Granted roles, never empty.
    pub roles: RoleSet,
    /// Origin of the role set.
    pub source: RoleSource,
}

/// Outcome of one role lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleLookup {
    /// The subject holds roles.
    Granted(ResolvedRoles),
    /// The subject is unknown to the role store; access is denied.
    Denied {
        /// Normalized subject that was denied.
        subject: SubjectEmail,
    },
}

/// Reachability of the configured role cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    /// Whether a cache backend is configured at all.
    pub enabled: bool,
    /// Whether the backend answered a health check.
    pub healthy: bool,
}

/// Application service resolving subject roles cache-aside.
///
/// A cached entry wins over the store until its ttl elapses, so role changes
/// in the store can take up to one ttl window to become visible.
#[derive(Clone)]
pub struct RoleLookupService {
    store: Arc<dyn RoleStore>,
    cache: Option<RoleCache>,
    config: RoleLookupConfig,
}

impl RoleLookupService {
    /// Creates a lookup service reading from the given store, without a cache.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>, config: RoleLookupConfig) -> Self {
        Self {
            store,
            cache: None,
            config,
        }
    }

    /// Places a role cache in front of the store.
    #[must_use]
    pub fn with_cache(mut self, cache: RoleCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves the role set for the subject carried by the request context.
    ///
    /// Errors are `AppError::Unauthorized` when the context has no usable
    /// subject and `AppError::StoreUnavailable` when the store cannot answer.
    /// Cache failures are never returned.
    pub async fn resolve(&self, context: &AuthenticatedRequestContext) -> AppResult<RoleLookup> {
        let subject = extract_subject(context)?;
        let request_id = context.correlation_id();

        if let Some(cache) = &self.cache {
            if let Some(roles) = cache.get(&subject).await {
                info!(request_id, %subject, "Cache HIT: role set served from cache");
                return Ok(grant_or_deny(subject, roles, RoleSource::Cache));
            }
            info!(request_id, %subject, "Cache MISS: querying role store");
        }

        let roles = match self.lookup_store(&subject).await {
            Ok(roles) => roles,
            Err(AppError::NotFound(detail)) => {
                warn!(request_id, %subject, %detail, "subject not found in role store");
                return Ok(RoleLookup::Denied { subject });
            }
            Err(lookup_error) => {
                error!(request_id, %subject, error = %lookup_error, "role store lookup failed");
                return Err(lookup_error);
            }
        };

        if roles.is_empty() {
            warn!(request_id, %subject, "role store returned an empty role set, denying");
            return Ok(RoleLookup::Denied { subject });
        }

        info!(
            request_id,
            %subject,
            roles = %roles.to_header_value(),
            "role set read from store"
        );

        if let Some(cache) = &self.cache {
            cache.set(&subject, &roles, self.config.cache_ttl).await;
        }

        Ok(RoleLookup::Granted(ResolvedRoles {
            subject,
            roles,
            source: RoleSource::Store,
        }))
    }

    /// Drops the cached role set for one subject. Returns whether one existed.
    pub async fn invalidate(&self, identifier: &str) -> AppResult<bool> {
        let subject = SubjectEmail::new(identifier)?;
        let Some(cache) = &self.cache else {
            return Ok(false);
        };

        let existed = cache.invalidate(&subject).await;
        info!(%subject, existed, "role cache invalidation requested");
        Ok(existed)
    }

    /// Reports whether a cache is configured and reachable.
    pub async fn cache_status(&self) -> CacheStatus {
        match &self.cache {
            Some(cache) => CacheStatus {
                enabled: true,
                healthy: cache.health().await,
            },
            None => CacheStatus {
                enabled: false,
                healthy: false,
            },
        }
    }

    /// Returns cache counters, if a cache is configured.
    #[must_use]
    pub fn cache_stats(&self) -> Option<RoleCacheStats> {
        self.cache.as_ref().map(RoleCache::stats)
    }

    async fn lookup_store(&self, subject: &SubjectEmail) -> AppResult<RoleSet> {
        tokio::time::timeout(self.config.store_timeout, self.store.lookup_roles(subject))
            .await
            .map_err(|_| {
                AppError::StoreUnavailable(format!(
                    "role store did not answer within {} ms",
                    self.config.store_timeout.as_millis()
                ))
            })?
    }
}

fn extract_subject(context: &AuthenticatedRequestContext) -> AppResult<SubjectEmail> {
    let raw_subject = context
        .subject()
        .ok_or_else(|| AppError::Unauthorized("No authorization token provided".to_owned()))?;

    SubjectEmail::new(raw_subject).map_err(|error| {
        AppError::Unauthorized(format!("Invalid subject identifier: {}", error.message()))
    })
}

fn grant_or_deny(subject: SubjectEmail, roles: RoleSet, source: RoleSource) -> RoleLookup {
    if roles.is_empty() {
        return RoleLookup::Denied { subject };
    }

    RoleLookup::Granted(ResolvedRoles {
        subject,
        roles,
        source,
    })
}
