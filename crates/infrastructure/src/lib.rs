//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_role_cache;
mod in_memory_role_store;
mod postgres_role_store;
mod redis_role_cache;

pub use in_memory_role_cache::InMemoryRoleCache;
pub use in_memory_role_store::InMemoryRoleStore;
pub use postgres_role_store::PostgresRoleStore;
pub use redis_role_cache::{ROLE_CACHE_KEY_PREFIX, RedisRoleCache};
