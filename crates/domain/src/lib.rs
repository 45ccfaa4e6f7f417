//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod role;

pub use role::{ROLE_NAME_MAX_LENGTH, RoleName, RoleSet};
