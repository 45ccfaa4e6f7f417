use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use rolegate_application::{ResolvedRoles, RoleLookup};
use rolegate_core::AppError;
use rolegate_core::headers::{USER_EMAIL, USER_ROLES};
use tracing::{info, warn};

use crate::auth::request_context;
use crate::dto::UserRolesResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub const USER_NOT_FOUND_DETAIL: &str = "User not found in role database";

/// ext_authz check for `/authz/roles`.
pub async fn role_headers_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> ApiResult<Response> {
    role_headers(&state, &method, None, &headers).await
}

/// ext_authz check for `/authz/roles/{*path}`. The suffix is only logged.
pub async fn role_headers_for_path_handler(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    role_headers(&state, &method, Some(path.as_str()), &headers).await
}

/// Direct JSON view of the caller's roles.
pub async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserRolesResponse>> {
    let resolved = resolve_roles(&state, &headers, None).await?;
    Ok(Json(UserRolesResponse::from(resolved)))
}

async fn role_headers(
    state: &AppState,
    method: &Method,
    path: Option<&str>,
    headers: &HeaderMap,
) -> ApiResult<Response> {
    let resolved = resolve_roles(state, headers, Some((method, path))).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        HeaderName::from_static(USER_EMAIL),
        header_value(resolved.subject.as_str())?,
    );
    response_headers.insert(
        HeaderName::from_static(USER_ROLES),
        header_value(&resolved.roles.to_header_value())?,
    );

    Ok((StatusCode::OK, response_headers).into_response())
}

async fn resolve_roles(
    state: &AppState,
    headers: &HeaderMap,
    check: Option<(&Method, Option<&str>)>,
) -> ApiResult<ResolvedRoles> {
    let context = request_context(headers)?;
    let request_id = context.correlation_id();

    match check {
        Some((method, Some(path))) => {
            info!(request_id, %method, path = %format!("/{path}"), "role lookup request");
        }
        Some((method, None)) => info!(request_id, %method, "role lookup request"),
        None => info!(request_id, "role listing request"),
    }

    match state.role_lookup_service.resolve(&context).await? {
        RoleLookup::Granted(resolved) => {
            info!(
                request_id,
                subject = %resolved.subject,
                roles = %resolved.roles.to_header_value(),
                source = resolved.source.as_str(),
                "roles resolved"
            );
            Ok(resolved)
        }
        RoleLookup::Denied { subject } => {
            warn!(request_id, %subject, "access denied, user not in role database");
            Err(AppError::Forbidden(USER_NOT_FOUND_DETAIL.to_owned()).into())
        }
    }
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|error| {
        AppError::Internal(format!("role lookup produced an invalid header value: {error}")).into()
    })
}
