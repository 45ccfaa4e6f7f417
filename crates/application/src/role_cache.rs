//! Failure-absorbing wrapper around a role cache backend.
//!
//! Cache infrastructure errors never leave this type: reads degrade to a
//! miss, writes and invalidations report `false`. Every absorbed failure is
//! logged and counted so it stays observable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rolegate_core::SubjectEmail;
use rolegate_domain::RoleSet;
use tracing::{debug, warn};

use crate::RoleCacheBackend;

/// Snapshot of role cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCacheStats {
    /// Reads served from the cache.
    pub hits: u64,
    /// Reads that found no live entry.
    pub misses: u64,
    /// Backend failures absorbed by the wrapper.
    pub failures: u64,
}

#[derive(Debug, Default)]
struct RoleCacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

/// Role cache handle shared by all requests.
#[derive(Clone)]
pub struct RoleCache {
    backend: Arc<dyn RoleCacheBackend>,
    counters: Arc<RoleCacheCounters>,
}

impl RoleCache {
    /// Creates a cache wrapper over one backend.
    #[must_use]
    pub fn new(backend: Arc<dyn RoleCacheBackend>) -> Self {
        Self {
            backend,
            counters: Arc::new(RoleCacheCounters::default()),
        }
    }

    /// Returns the cached role set, or `None` on a miss or backend failure.
    pub async fn get(&self, subject: &SubjectEmail) -> Option<RoleSet> {
        match self.backend.get_roles(subject).await {
            Ok(Some(roles)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%subject, "role cache hit");
                Some(roles)
            }
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%subject, "role cache miss");
                None
            }
            Err(error) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%subject, %error, "role cache read failed, treating as miss");
                None
            }
        }
    }

    /// Writes a role set with ttl. Returns whether the entry was stored.
    pub async fn set(&self, subject: &SubjectEmail, roles: &RoleSet, ttl: Duration) -> bool {
        if ttl.is_zero() {
            return false;
        }

        match self.backend.set_roles(subject, roles, ttl).await {
            Ok(()) => {
                debug!(%subject, ttl_seconds = ttl.as_secs(), "cached role set");
                true
            }
            Err(error) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%subject, %error, "role cache write failed, continuing uncached");
                false
            }
        }
    }

    /// Removes one cached entry. Returns whether an entry existed.
    pub async fn invalidate(&self, subject: &SubjectEmail) -> bool {
        match self.backend.invalidate_roles(subject).await {
            Ok(existed) => existed,
            Err(error) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%subject, %error, "role cache invalidation failed");
                false
            }
        }
    }

    /// Returns whether the backend currently answers.
    pub async fn health(&self) -> bool {
        match self.backend.ping().await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "role cache health check failed");
                false
            }
        }
    }

    /// Returns a snapshot of the hit, miss and failure counters.
    #[must_use]
    pub fn stats(&self) -> RoleCacheStats {
        RoleCacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}
