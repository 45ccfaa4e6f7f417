//! Application services and ports.

#![forbid(unsafe_code)]

mod role_cache;
mod role_lookup_service;
mod role_ports;

pub use role_cache::{RoleCache, RoleCacheStats};
pub use role_lookup_service::{
    CacheStatus, ResolvedRoles, RoleLookup, RoleLookupConfig, RoleLookupService, RoleSource,
};
pub use role_ports::{RoleCacheBackend, RoleStore};
