//! Compliance document domain model.
//!
//! At most one version per (person, document type) is current.
//! Superseded versions are kept for audit and never scored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::ExpiryStatus;
use crate::taxonomy::Authority;

/// Review lifecycle of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Filed against a type, awaiting verification.
    Uploaded,
    Verified,
    /// Rejected; does not satisfy any requirement.
    Rejected,
    /// Classifier confidence too low to file. Distinct from missing.
    Unclassified,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Uploaded => "uploaded",
            ReviewStatus::Verified => "verified",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Unclassified => "unclassified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(ReviewStatus::Uploaded),
            "verified" => Some(ReviewStatus::Verified),
            "rejected" => Some(ReviewStatus::Rejected),
            "unclassified" => Some(ReviewStatus::Unclassified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceDocument {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    /// `None` while unclassified.
    pub document_type_id: Option<String>,
    pub authority: Option<Authority>,
    /// Classifier's best guess when the document was not auto-filed.
    pub suggested_type_id: Option<String>,
    pub file_name: String,
    pub file_path: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub review_status: ReviewStatus,
    /// Last status written by the workflow engine.
    pub expiry_status: Option<ExpiryStatus>,
    pub confidence: Option<u8>,
    pub version: u32,
    pub is_current: bool,
    pub review_notes: Option<String>,
    pub metadata: serde_json::Value,
    pub uploaded_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl ComplianceDocument {
    /// Current, classified and not rejected.
    pub fn counts_toward_compliance(&self) -> bool {
        self.is_current
            && self.document_type_id.is_some()
            && !matches!(
                self.review_status,
                ReviewStatus::Rejected | ReviewStatus::Unclassified
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    pub document_type_id: Option<String>,
    pub suggested_type_id: Option<String>,
    pub file_name: String,
    pub file_path: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub review_status: ReviewStatus,
    pub confidence: Option<u8>,
    pub metadata: Option<serde_json::Value>,
}

/// Review decision applied to a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub review_status: ReviewStatus,
    pub review_notes: Option<String>,
}
