//! In-process role cache backed by moka.
//!
//! Entries carry their own ttl, and capacity pressure evicts the least
//! recently used subject first.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use rolegate_application::RoleCacheBackend;
use rolegate_core::{AppResult, SubjectEmail};
use rolegate_domain::RoleSet;

#[derive(Debug, Clone)]
struct CachedRoles {
    roles: RoleSet,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<SubjectEmail, CachedRoles> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &SubjectEmail,
        value: &CachedRoles,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &SubjectEmail,
        value: &CachedRoles,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory cache adapter for subject role sets.
#[derive(Clone)]
pub struct InMemoryRoleCache {
    entries: Cache<SubjectEmail, CachedRoles>,
}

impl InMemoryRoleCache {
    /// Creates a cache holding at most `max_entries` subjects.
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }
}

#[async_trait]
impl RoleCacheBackend for InMemoryRoleCache {
    async fn get_roles(&self, subject: &SubjectEmail) -> AppResult<Option<RoleSet>> {
        Ok(self.entries.get(subject).await.map(|entry| entry.roles))
    }

    async fn set_roles(
        &self,
        subject: &SubjectEmail,
        roles: &RoleSet,
        ttl: Duration,
    ) -> AppResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }

        self.entries
            .insert(
                subject.clone(),
                CachedRoles {
                    roles: roles.clone(),
                    ttl,
                },
            )
            .await;

        Ok(())
    }

    async fn invalidate_roles(&self, subject: &SubjectEmail) -> AppResult<bool> {
        Ok(self.entries.remove(subject).await.is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rolegate_application::RoleCacheBackend;
    use rolegate_core::SubjectEmail;
    use rolegate_domain::RoleSet;

    use super::InMemoryRoleCache;

    fn subject(value: &str) -> SubjectEmail {
        match SubjectEmail::new(value) {
            Ok(subject) => subject,
            Err(error) => panic!("invalid test subject: {error}"),
        }
    }

    #[tokio::test]
    async fn stored_roles_are_returned_until_invalidated() {
        let cache = InMemoryRoleCache::new(16);
        let alice = subject("alice@example.com");
        let roles = RoleSet::new(["user", "admin"]).unwrap_or_default();

        assert!(
            cache
                .set_roles(&alice, &roles, Duration::from_secs(300))
                .await
                .is_ok()
        );
        assert_eq!(
            cache.get_roles(&alice).await.ok().flatten(),
            Some(roles.clone())
        );

        assert!(matches!(cache.invalidate_roles(&alice).await, Ok(true)));
        assert!(matches!(cache.invalidate_roles(&alice).await, Ok(false)));
        assert_eq!(cache.get_roles(&alice).await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn entries_expire_after_their_ttl() {
        let cache = InMemoryRoleCache::new(16);
        let alice = subject("alice@example.com");
        let roles = RoleSet::new(["user"]).unwrap_or_default();

        let _ = cache
            .set_roles(&alice, &roles, Duration::from_millis(200))
            .await;
        assert!(cache.get_roles(&alice).await.ok().flatten().is_some());

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(cache.get_roles(&alice).await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn overwrite_refreshes_ttl() {
        let cache = InMemoryRoleCache::new(16);
        let alice = subject("alice@example.com");
        let user = RoleSet::new(["user"]).unwrap_or_default();
        let admin = RoleSet::new(["user", "admin"]).unwrap_or_default();

        let _ = cache
            .set_roles(&alice, &user, Duration::from_millis(200))
            .await;
        let _ = cache
            .set_roles(&alice, &admin, Duration::from_secs(300))
            .await;

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(cache.get_roles(&alice).await.ok().flatten(), Some(admin));
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = InMemoryRoleCache::new(2);
        let roles = RoleSet::new(["user"]).unwrap_or_default();

        for email in ["a@example.com", "b@example.com", "c@example.com", "d@example.com"] {
            let _ = cache
                .set_roles(&subject(email), &roles, Duration::from_secs(300))
                .await;
        }
        cache.entries.run_pending_tasks().await;

        assert!(cache.entries.entry_count() <= 2);
    }

    #[tokio::test]
    async fn least_recently_read_subject_is_evicted_first() {
        let cache = InMemoryRoleCache::new(2);
        let roles = RoleSet::new(["user"]).unwrap_or_default();
        let ttl = Duration::from_secs(300);
        let (a, b, c) = (
            subject("a@example.com"),
            subject("b@example.com"),
            subject("c@example.com"),
        );

        let _ = cache.set_roles(&a, &roles, ttl).await;
        let _ = cache.set_roles(&b, &roles, ttl).await;
        assert!(cache.get_roles(&a).await.ok().flatten().is_some());
        cache.entries.run_pending_tasks().await;

        let _ = cache.set_roles(&c, &roles, ttl).await;
        cache.entries.run_pending_tasks().await;

        assert!(cache.get_roles(&a).await.ok().flatten().is_some());
        assert!(cache.get_roles(&b).await.ok().flatten().is_none());
        assert!(cache.get_roles(&c).await.ok().flatten().is_some());
    }
}
