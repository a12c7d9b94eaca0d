//! Novum Report — the monthly compliance report: tenant metrics, the
//! HTML email body, delivery through a transactional email API, and the
//! job that ties them together per tenant.

pub mod config;
pub mod job;
pub mod mailer;
pub mod metrics;
pub mod render;

pub use config::{MailerConfig, ReportConfig};
pub use job::{ReportJob, ReportRequest, ReportResponse, TenantReport};
pub use mailer::{MailError, Mailer, OutboundEmail, ResendMailer};
pub use metrics::ComplianceMetrics;
