use std::time::Duration;

use async_trait::async_trait;
use rolegate_core::{AppResult, SubjectEmail};
use rolegate_domain::RoleSet;

/// Authoritative source of subject role sets.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns the role set stored for a subject.
    ///
    /// Fails with `AppError::NotFound` when the subject has no row, and with
    /// `AppError::StoreUnavailable` when the store cannot answer.
    async fn lookup_roles(&self, subject: &SubjectEmail) -> AppResult<RoleSet>;
}

/// Cache backend port for subject role sets.
///
/// Implementations report infrastructure failures as errors; the
/// [`crate::RoleCache`] wrapper is what turns them into misses.
#[async_trait]
pub trait RoleCacheBackend: Send + Sync {
    /// Returns the cached role set for one subject, if present and unexpired.
    async fn get_roles(&self, subject: &SubjectEmail) -> AppResult<Option<RoleSet>>;

    /// Stores a role set for one subject with ttl, replacing any previous entry.
    async fn set_roles(
        &self,
        subject: &SubjectEmail,
        roles: &RoleSet,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Removes the cached role set for one subject. Returns whether one existed.
    async fn invalidate_roles(&self, subject: &SubjectEmail) -> AppResult<bool>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> AppResult<()>;
}
