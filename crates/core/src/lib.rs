//! Shared primitives for all Rust crates in Rolegate.

#![forbid(unsafe_code)]

/// Authenticated subject primitives shared across services.
pub mod auth;

/// Header names shared between the role lookup service and its gateway.
pub mod headers;

use thiserror::Error;

pub use auth::{AuthenticatedRequestContext, SubjectEmail};

/// Result type used across Rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input, configuration, or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested subject or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No verifiable subject was supplied with the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Subject is known but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Role cache backend could not be reached or returned garbage.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Authoritative role store could not answer in time.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the bare message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::CacheUnavailable(message)
            | Self::StoreUnavailable(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}
