//! Novum Compliance — document classification, per-person and
//! per-tenant compliance views, and the automated expiry workflow.

pub mod classification;
pub mod config;
pub mod error;
pub mod service;
pub mod workflow;

pub use classification::{Classification, ClassificationInput, Disposition, DocumentClassifier};
pub use config::{ComplianceConfig, EscalationSlas};
pub use error::ComplianceError;
pub use service::{ComplianceService, DocumentUpload, PersonCompliance, TenantComplianceSummary};
pub use workflow::{WorkflowEngine, WorkflowRunSummary};
