//! Error types for the Novum compliance system.
//!
//! Every layer returns a tagged variant; callers match on the variant
//! instead of inspecting message text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NovumError {
    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    #[error("File upload error: {message}")]
    FileUpload { message: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type NovumResult<T> = Result<T, NovumError>;

impl NovumError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        NovumError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        NovumError::Validation {
            message: message.into(),
        }
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        NovumError::BusinessRule {
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            NovumError::Authentication { .. } => "auth_invalid",
            NovumError::PermissionDenied { .. } => "permission_denied",
            NovumError::NotFound { .. } => "not_found",
            NovumError::AlreadyExists { .. } => "duplicate_record",
            NovumError::Validation { .. } => "validation_error",
            NovumError::Database(_) => "database_error",
            NovumError::Network(_) => "network_error",
            NovumError::Timeout(_) => "timeout",
            NovumError::ServiceUnavailable(_) => "service_unavailable",
            NovumError::BusinessRule { .. } => "business_rule_violation",
            NovumError::FileUpload { .. } => "file_upload_error",
            NovumError::TenantContext => "tenant_context",
            NovumError::Internal(_) => "internal",
        }
    }

    /// Network, timeout and unavailable errors are routed to the
    /// "service unavailable" path rather than the generic error path.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            NovumError::Network(_) | NovumError::Timeout(_) | NovumError::ServiceUnavailable(_)
        )
    }

    /// Templated message that never leaks internals.
    pub fn generic_message(&self) -> &'static str {
        match self {
            NovumError::Authentication { .. } => "Invalid authentication credentials.",
            NovumError::PermissionDenied { .. } => {
                "You do not have permission to perform this action."
            }
            NovumError::NotFound { .. } => "The requested record was not found.",
            NovumError::AlreadyExists { .. } => "A record with this information already exists.",
            NovumError::Validation { .. } => "Please check your input and try again.",
            NovumError::Database(_) => "A database error occurred. Please try again.",
            NovumError::Network(_) => "Network error. Please check your connection.",
            NovumError::Timeout(_) => "Request timed out. Please try again.",
            NovumError::ServiceUnavailable(_) => {
                "Service temporarily unavailable. Please try again later."
            }
            NovumError::BusinessRule { .. } => "This operation is not allowed.",
            NovumError::FileUpload { .. } => "File upload failed. Please try again.",
            NovumError::TenantContext => "Your organisation context is missing. Please sign in again.",
            NovumError::Internal(_) => "An internal error occurred. Please contact support.",
        }
    }

    /// Message shown to end users: the literal message in development,
    /// the generic template when `production` is set.
    pub fn user_message(&self, production: bool) -> String {
        if production {
            self.generic_message().to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_family_is_service_unavailable() {
        assert!(NovumError::Network("reset".into()).is_service_unavailable());
        assert!(NovumError::Timeout("30s".into()).is_service_unavailable());
        assert!(NovumError::ServiceUnavailable("503".into()).is_service_unavailable());
        assert!(!NovumError::Database("x".into()).is_service_unavailable());
        assert!(!NovumError::not_found("person", "p1").is_service_unavailable());
    }

    #[test]
    fn production_hides_literal_message() {
        let err = NovumError::business_rule("stage Ongoing is final");
        assert_eq!(
            err.user_message(false),
            "Business rule violation: stage Ongoing is final"
        );
        assert_eq!(err.user_message(true), "This operation is not allowed.");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(NovumError::not_found("task", 1).code(), "not_found");
        assert_eq!(
            NovumError::AlreadyExists {
                entity: "tenant".into()
            }
            .code(),
            "duplicate_record"
        );
        assert_eq!(NovumError::TenantContext.code(), "tenant_context");
    }
}
