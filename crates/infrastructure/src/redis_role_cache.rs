//! Redis-backed role cache.
//!
//! Layout: `user:platform-roles:{lowercased-email}` holding a JSON array of
//! role names, written with `SETEX`. Capacity and LRU eviction are left to
//! the server (`maxmemory` with `allkeys-lru`).

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisError};
use rolegate_application::RoleCacheBackend;
use rolegate_core::{AppError, AppResult, SubjectEmail};
use rolegate_domain::RoleSet;

/// Key prefix shared with every other reader of the platform role cache.
pub const ROLE_CACHE_KEY_PREFIX: &str = "user:platform-roles";

/// Redis implementation of the role cache backend port.
#[derive(Clone)]
pub struct RedisRoleCache {
    client: redis::Client,
    key_prefix: String,
    operation_timeout: Duration,
}

impl RedisRoleCache {
    /// Creates a cache adapter with a configured Redis client and per-call timeout.
    #[must_use]
    pub fn new(client: redis::Client, operation_timeout: Duration) -> Self {
        Self {
            client,
            key_prefix: ROLE_CACHE_KEY_PREFIX.to_owned(),
            operation_timeout,
        }
    }

    /// Overrides the key prefix, mostly to isolate test runs.
    #[must_use]
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    fn key_for(&self, subject: &SubjectEmail) -> String {
        format!("{}:{}", self.key_prefix, subject.as_str())
    }

    async fn run<T, F>(&self, operation: &str, command: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        tokio::time::timeout(self.operation_timeout, command)
            .await
            .map_err(|_| {
                AppError::CacheUnavailable(format!(
                    "redis {operation} timed out after {} ms",
                    self.operation_timeout.as_millis()
                ))
            })?
            .map_err(|error| {
                AppError::CacheUnavailable(format!("redis {operation} failed: {error}"))
            })
    }
}

/// `SETEX` takes whole seconds; partial seconds round up so entries never
/// expire earlier than asked.
fn ttl_seconds(ttl: Duration) -> u64 {
    (ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)).max(1)
}

/// Undecodable entries surface as cache failures so the store answers instead.
fn decode_roles(subject: &SubjectEmail, value: &str) -> AppResult<RoleSet> {
    serde_json::from_str::<RoleSet>(value).map_err(|error| {
        AppError::CacheUnavailable(format!(
            "invalid role cache entry for '{subject}': {error}"
        ))
    })
}

#[async_trait]
impl RoleCacheBackend for RedisRoleCache {
    async fn get_roles(&self, subject: &SubjectEmail) -> AppResult<Option<RoleSet>> {
        let key = self.key_for(subject);
        let encoded = self
            .run("get", async {
                let mut connection = self.client.get_multiplexed_async_connection().await?;
                connection.get::<_, Option<String>>(key).await
            })
            .await?;

        encoded
            .as_deref()
            .map(|value| decode_roles(subject, value))
            .transpose()
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

        let key = self.key_for(subject);
        let value = serde_json::to_string(roles).map_err(|error| {
            AppError::Internal(format!("failed to encode role set for cache: {error}"))
        })?;
        let ttl_seconds = ttl_seconds(ttl);

        self.run("setex", async {
            let mut connection = self.client.get_multiplexed_async_connection().await?;
            connection.set_ex::<_, _, ()>(key, value, ttl_seconds).await
        })
        .await
    }

    async fn invalidate_roles(&self, subject: &SubjectEmail) -> AppResult<bool> {
        let key = self.key_for(subject);
        let removed = self
            .run("del", async {
                let mut connection = self.client.get_multiplexed_async_connection().await?;
                connection.del::<_, i64>(key).await
            })
            .await?;

        Ok(removed > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        let response = self
            .run("ping", async {
                let mut connection = self.client.get_multiplexed_async_connection().await?;
                connection.ping::<String>().await
            })
            .await?;

        if response.eq_ignore_ascii_case("pong") {
            Ok(())
        } else {
            Err(AppError::CacheUnavailable(format!(
                "unexpected redis ping response: {response}"
            )))
        }
    }
}
