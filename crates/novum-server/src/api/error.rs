//! JSON error responses.
//!
//! Every failure leaves the server as `{ code, message }`. The status
//! follows the error variant; network-family errors collapse into a 503
//! `service_unavailable` so clients can show a retry screen.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use novum_core::error::NovumError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn api_validation_error(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorResponse {
            code: "validation_error".to_string(),
            message: message.to_string(),
        },
    }
}

pub fn status_for(err: &NovumError) -> StatusCode {
    match err {
        NovumError::Authentication { .. } => StatusCode::UNAUTHORIZED,
        NovumError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        NovumError::NotFound { .. } => StatusCode::NOT_FOUND,
        NovumError::AlreadyExists { .. } => StatusCode::CONFLICT,
        NovumError::Validation { .. }
        | NovumError::FileUpload { .. }
        | NovumError::TenantContext => StatusCode::BAD_REQUEST,
        NovumError::BusinessRule { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        NovumError::Network(_) | NovumError::Timeout(_) | NovumError::ServiceUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        NovumError::Database(_) | NovumError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error. In production the message is the generic
/// template for the variant.
pub fn api_error(err: &NovumError, production: bool) -> ApiError {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(error = %err, code = err.code(), "request failed");
    }
    let code = if err.is_service_unavailable() {
        "service_unavailable"
    } else {
        err.code()
    };
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: err.user_message(production),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_statuses() {
        let cases = [
            (NovumError::not_found("person", "p1"), StatusCode::NOT_FOUND, "not_found"),
            (NovumError::validation("bad"), StatusCode::BAD_REQUEST, "validation_error"),
            (
                NovumError::business_rule("closed"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "business_rule_violation",
            ),
            (
                NovumError::Timeout("db".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
            ),
            (
                NovumError::Network("reset".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
            ),
            (
                NovumError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
            ),
        ];
        for (err, status, code) in cases {
            let api = api_error(&err, false);
            assert_eq!(api.status, status, "{err}");
            assert_eq!(api.body.code, code);
        }
    }

    #[test]
    fn production_hides_literal_messages() {
        let err = NovumError::Database("table compliance_task is locked".into());
        assert!(api_error(&err, false).body.message.contains("locked"));

        let hidden = api_error(&err, true);
        assert!(!hidden.body.message.contains("locked"));
        assert_eq!(hidden.body.message, err.generic_message());
    }
}
