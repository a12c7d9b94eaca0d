//! Compliance service error types.

use novum_core::error::NovumError;
use novum_core::taxonomy::Stage;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("invalid classification pattern for {type_id}: {reason}")]
    InvalidPattern { type_id: String, reason: String },

    #[error("unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("document {0} is already classified")]
    AlreadyClassified(Uuid),

    #[error("document {0} must be classified before review")]
    NotClassified(Uuid),

    #[error("task {0} is already closed")]
    TaskClosed(Uuid),

    #[error("stage {} has no next stage", .0.as_str())]
    FinalStage(Stage),

    #[error("stage {} is incomplete: {}", .stage.as_str(), .outstanding.join(", "))]
    StageIncomplete {
        stage: Stage,
        outstanding: Vec<String>,
    },
}

impl From<ComplianceError> for NovumError {
    fn from(err: ComplianceError) -> Self {
        match err {
            ComplianceError::InvalidPattern { .. } => NovumError::Internal(err.to_string()),
            ComplianceError::UnknownDocumentType(_) => NovumError::validation(err.to_string()),
            ComplianceError::AlreadyClassified(_)
            | ComplianceError::NotClassified(_)
            | ComplianceError::TaskClosed(_)
            | ComplianceError::FinalStage(_)
            | ComplianceError::StageIncomplete { .. } => NovumError::business_rule(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_stage_is_a_business_rule() {
        let err: NovumError = ComplianceError::StageIncomplete {
            stage: Stage::PreEmployment,
            outstanding: vec!["dbs_certificate".into(), "signed_contract".into()],
        }
        .into();
        assert_eq!(err.code(), "business_rule_violation");
        assert!(err.to_string().contains("dbs_certificate, signed_contract"));
    }

    #[test]
    fn unknown_type_is_validation() {
        let err: NovumError = ComplianceError::UnknownDocumentType("tax_return".into()).into();
        assert_eq!(err.code(), "validation_error");
    }
}
