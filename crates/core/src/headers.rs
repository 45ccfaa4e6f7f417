//! Header-name contract between the gateway and the role lookup service.
//!
//! HTTP/2 header names are lower case; the gateway RBAC filter matches these
//! exact strings, so every emitter and test reads them from here.

/// Bearer token forwarded by the gateway.
pub const AUTHORIZATION: &str = "authorization";

/// Correlation identifier propagated by the gateway.
pub const REQUEST_ID: &str = "x-request-id";

/// Normalized subject email emitted on a successful lookup.
pub const USER_EMAIL: &str = "x-user-email";

/// Comma-separated role list emitted on a successful lookup.
pub const USER_ROLES: &str = "x-user-roles";

/// Separator used in [`USER_ROLES`]. No surrounding whitespace is allowed.
pub const ROLE_SEPARATOR: char = ',';
