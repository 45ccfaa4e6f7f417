use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegate_core::AppError;
use tracing::error;

use crate::dto::ErrorResponse;

/// Detail returned for every failure that must not leak internals.
pub const INTERNAL_ERROR_DETAIL: &str = "Internal authorization error";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::CacheUnavailable(_)
            | AppError::StoreUnavailable(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = if status.is_server_error() {
            error!(error = %self.0, "request failed");
            INTERNAL_ERROR_DETAIL.to_owned()
        } else {
            self.0.message().to_owned()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use rolegate_core::AppError;

    use super::ApiError;

    #[test]
    fn errors_map_to_gateway_status_codes() {
        let cases = [
            (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("no".to_owned()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("ghost".to_owned()), StatusCode::FORBIDDEN),
            (AppError::Forbidden("nope".to_owned()), StatusCode::FORBIDDEN),
            (
                AppError::StoreUnavailable("down".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Internal("boom".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }
}
