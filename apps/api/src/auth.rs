//! Request identity extraction.
//!
//! The gateway has already verified the bearer token signature, so only the
//! payload is decoded here to read the `email` claim.

use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rolegate_core::headers::{AUTHORIZATION, REQUEST_ID};
use rolegate_core::{AppError, AppResult, AuthenticatedRequestContext};
use serde::Deserialize;
use uuid::Uuid;

const INVALID_HEADER_FORMAT: &str =
    "Invalid authorization header format. Expected 'Bearer <token>'";

#[derive(Debug, Deserialize)]
struct TokenClaims {
    email: Option<String>,
}

/// Builds the request context from gateway headers.
///
/// A missing `authorization` header yields a context without subject; a
/// present but unusable one is rejected here.
pub fn request_context(headers: &HeaderMap) -> AppResult<AuthenticatedRequestContext> {
    let correlation_id = headers
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let subject = headers
        .get(AUTHORIZATION)
        .map(|value| {
            let value = value
                .to_str()
                .map_err(|_| AppError::Unauthorized(INVALID_HEADER_FORMAT.to_owned()))?;
            let token = bearer_token(value)?;
            email_claim(token)
        })
        .transpose()?;

    Ok(AuthenticatedRequestContext::new(subject, correlation_id))
}

fn bearer_token(header_value: &str) -> AppResult<&str> {
    let mut parts = header_value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::Unauthorized(INVALID_HEADER_FORMAT.to_owned())),
    }
}

fn email_claim(token: &str) -> AppResult<String> {
    let invalid = |reason: String| AppError::Unauthorized(format!("Invalid token: {reason}"));

    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(invalid("Invalid JWT token format".to_owned()));
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|error| invalid(format!("payload is not base64url: {error}")))?;
    let claims: TokenClaims = serde_json::from_slice(&decoded)
        .map_err(|error| invalid(format!("payload is not a JSON object: {error}")))?;

    claims
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| invalid("Email claim not found in JWT payload".to_owned()))
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// Unsigned token carrying `claims` as its payload.
    pub fn token_with_claims(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    pub fn token_for(email: &str) -> String {
        token_with_claims(&format!(r#"{{"sub":"42","email":"{email}"}}"#))
    }
}
