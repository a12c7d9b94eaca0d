//! The monthly compliance report job.
//!
//! Tenants are processed one after another. Anything that goes wrong
//! inside a tenant (scoring, delivery, audit) is recorded on that
//! tenant's [`TenantReport`] and the loop moves on; only a failure to
//! load the tenant list aborts the run.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use novum_compliance::ComplianceService;
use novum_core::error::{NovumError, NovumResult};
use novum_core::expiry::{ExpiringItem, ItemSource};
use novum_core::models::audit::CreateAuditLogEntry;
use novum_core::models::tenant::Tenant;
use novum_core::models::user_profile::StaffRole;
use novum_core::repository::{
    AuditLogRepository, ComplianceStore, TenantRepository, UserProfileRepository,
};

use crate::config::ReportConfig;
use crate::mailer::{Mailer, OutboundEmail};
use crate::metrics::ComplianceMetrics;
use crate::render::{ReportContent, render_report};

pub const AUDIT_ACTION: &str = "compliance_report_generated";
pub const AUDIT_ENTITY: &str = "compliance/monthly_report";

pub const SKIP_NOTIFICATIONS_DISABLED: &str = "notifications_disabled";
pub const SKIP_EMAIL_NOT_CONFIGURED: &str = "email_not_configured";
pub const SKIP_NO_RECIPIENTS: &str = "no_recipients";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    /// Restrict the run to one tenant. Null or blank means every tenant.
    #[serde(deserialize_with = "blank_as_none")]
    pub tenant_id: Option<Uuid>,
    /// Send even when the tenant has turned report emails off.
    pub force_email: bool,
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Uuid>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => Uuid::parse_str(raw.trim())
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantReport {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    /// `YYYY-MM`
    pub month: String,
    /// Absent when the tenant could not be scored.
    pub metrics: Option<ComplianceMetrics>,
    pub expiring_items_count: usize,
    pub recipients: usize,
    pub emails_sent: usize,
    /// True only when every recipient's email was accepted.
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TenantReport {
    fn new(tenant: &Tenant, month: String) -> Self {
        Self {
            tenant_id: tenant.id,
            tenant_name: tenant.name.clone(),
            month,
            metrics: None,
            expiring_items_count: 0,
            recipients: 0,
            emails_sent: 0,
            email_sent: false,
            skipped_reason: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub message: String,
    pub reports: Vec<TenantReport>,
}

/// Keep items due between today and the report horizon. Training uses
/// its own, shorter horizon.
pub fn report_window(items: Vec<ExpiringItem>, config: &ReportConfig) -> Vec<ExpiringItem> {
    items
        .into_iter()
        .filter(|item| {
            let horizon = match item.source {
                ItemSource::Training => config.training_horizon_days,
                ItemSource::Document | ItemSource::RightToWork => config.expiry_horizon_days,
            };
            (0..=horizon).contains(&item.days_until_expiry)
        })
        .collect()
}

pub fn report_subject(tenant_name: &str, today: NaiveDate) -> String {
    format!(
        "Monthly Compliance Report - {} - {}",
        tenant_name,
        today.format("%B %Y")
    )
}

pub struct ReportJob<S: ComplianceStore, M: Mailer> {
    compliance: Arc<ComplianceService<S>>,
    /// `None` disables sending; reports are still computed and audited.
    mailer: Option<M>,
    config: ReportConfig,
}

impl<S: ComplianceStore, M: Mailer> ReportJob<S, M> {
    pub fn new(
        compliance: Arc<ComplianceService<S>>,
        mailer: Option<M>,
        config: ReportConfig,
    ) -> Self {
        Self {
            compliance,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Generate, deliver and audit the report for every selected tenant.
    pub async fn run(&self, request: ReportRequest) -> NovumResult<ReportResponse> {
        let store = self.compliance.store();

        // 1. Select tenants
        let tenants = match request.tenant_id {
            Some(id) => {
                let tenant = store.tenants().get_by_id(id).await?;
                if tenant.active {
                    vec![tenant]
                } else {
                    info!(tenant_id = %id, "tenant inactive, no report generated");
                    Vec::new()
                }
            }
            None => store.tenants().list_active().await?,
        };

        // 2. One isolated report per tenant
        let mut reports = Vec::with_capacity(tenants.len());
        for tenant in &tenants {
            let report = self.report_tenant(tenant, request.force_email).await;
            if let Some(e) = &report.error {
                error!(tenant_id = %tenant.id, error = %e, "compliance report failed");
            }
            reports.push(report);
        }

        info!(
            tenants = tenants.len(),
            emailed = reports.iter().filter(|r| r.email_sent).count(),
            "monthly compliance report run complete"
        );

        Ok(ReportResponse {
            success: true,
            message: format!("Generated {} compliance reports", reports.len()),
            reports,
        })
    }

    async fn report_tenant(&self, tenant: &Tenant, force_email: bool) -> TenantReport {
        let today = self.compliance.today();
        let mut report = TenantReport::new(tenant, today.format("%Y-%m").to_string());

        if let Err(e) = self.build_and_deliver(tenant, force_email, today, &mut report).await {
            report.error = Some(e.to_string());
            report.email_sent = false;
            return report;
        }

        let audit = CreateAuditLogEntry::system(
            tenant.id,
            AUDIT_ACTION,
            AUDIT_ENTITY,
            Some(report.month.clone()),
            json!({
                "month": report.month,
                "metrics": report.metrics,
                "expiring_items": report.expiring_items_count,
                "recipients": report.recipients,
                "emails_sent": report.emails_sent,
                "email_sent": report.email_sent,
                "skipped_reason": report.skipped_reason,
                "error": report.error,
            }),
        );
        if let Err(e) = self.compliance.store().audit().append(audit).await {
            report.error.get_or_insert_with(|| format!("audit log write failed: {e}"));
        }

        report
    }

    async fn build_and_deliver(
        &self,
        tenant: &Tenant,
        force_email: bool,
        today: NaiveDate,
        report: &mut TenantReport,
    ) -> NovumResult<()> {
        let store = self.compliance.store();

        // 1. Metrics and the expiry list
        let scores = self.compliance.score_tenant(tenant.id).await?;
        let metrics = ComplianceMetrics::from_scores(&scores);
        let lookahead = self
            .config
            .expiry_horizon_days
            .max(self.config.training_horizon_days);
        let items = report_window(
            self.compliance.list_expiring_items(tenant.id, lookahead).await?,
            &self.config,
        );
        report.metrics = Some(metrics);
        report.expiring_items_count = items.len();

        // 2. Recipients
        let recipients: Vec<String> = store
            .profiles()
            .list_by_roles(tenant.id, &StaffRole::REPORT_RECIPIENTS)
            .await?
            .into_iter()
            .filter_map(|p| p.email)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        report.recipients = recipients.len();

        // 3. Delivery
        let mailer = if !tenant.settings.compliance_email_notifications && !force_email {
            return skip(tenant, report, SKIP_NOTIFICATIONS_DISABLED);
        } else if let Some(mailer) = &self.mailer {
            mailer
        } else {
            return skip(tenant, report, SKIP_EMAIL_NOT_CONFIGURED);
        };
        if recipients.is_empty() {
            return skip(tenant, report, SKIP_NO_RECIPIENTS);
        }

        let html = render_report(&ReportContent {
            tenant_name: &tenant.name,
            report_date: today,
            metrics: &metrics,
            items: &items,
            overflow_limit: self.config.overflow_limit,
            horizon_days: self.config.expiry_horizon_days,
            app_url: &self.config.app_url,
        })
        .map_err(|e| NovumError::Internal(format!("report template: {e}")))?;
        let subject = report_subject(&tenant.name, today);

        let mut first_failure = None;
        for to in recipients {
            let email = OutboundEmail {
                from: self.config.from.clone(),
                to: vec![to],
                subject: subject.clone(),
                html: html.clone(),
            };
            match mailer.send(&email).await {
                Ok(()) => report.emails_sent += 1,
                Err(e) => {
                    warn!(tenant_id = %tenant.id, to = ?email.to, error = %e, "report email failed");
                    first_failure.get_or_insert(e);
                }
            }
        }

        report.email_sent = first_failure.is_none() && report.emails_sent > 0;
        if let Some(e) = first_failure {
            report.error = Some(e.to_string());
        }
        Ok(())
    }
}

fn skip(tenant: &Tenant, report: &mut TenantReport, reason: &str) -> NovumResult<()> {
    info!(tenant_id = %tenant.id, reason, "report email skipped");
    report.skipped_reason = Some(reason.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use novum_core::expiry::{ExpiryStatus, Urgency};

    #[test]
    fn blank_tenant_id_means_every_tenant() {
        let request: ReportRequest = serde_json::from_str(r#"{"tenant_id":"  "}"#).unwrap();
        assert_eq!(request.tenant_id, None);

        let request: ReportRequest = serde_json::from_str(r#"{"tenant_id":null,"force_email":true}"#).unwrap();
        assert_eq!(request.tenant_id, None);
        assert!(request.force_email);

        let id = Uuid::new_v4();
        let request: ReportRequest = serde_json::from_str(&format!(r#"{{"tenant_id":"{id}"}}"#)).unwrap();
        assert_eq!(request.tenant_id, Some(id));

        assert!(serde_json::from_str::<ReportRequest>(r#"{"tenant_id":"nope"}"#).is_err());
    }

    fn item(source: ItemSource, days: i64) -> ExpiringItem {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        ExpiringItem {
            source,
            source_id: Uuid::new_v4(),
            person_id: Uuid::new_v4(),
            person_name: "Mary Seacole".into(),
            item_type: "x".into(),
            item_name: "X".into(),
            expiry_date: today + chrono::Duration::days(days),
            days_until_expiry: days,
            severity: Urgency::Medium,
            status: ExpiryStatus::ExpiringSoon,
        }
    }

    #[test]
    fn window_drops_overdue_and_far_training() {
        let config = ReportConfig::default();
        let kept = report_window(
            vec![
                item(ItemSource::Document, -1),
                item(ItemSource::Document, 0),
                item(ItemSource::RightToWork, 90),
                item(ItemSource::RightToWork, 91),
                item(ItemSource::Training, 30),
                item(ItemSource::Training, 31),
            ],
            &config,
        );
        let days: Vec<(ItemSource, i64)> = kept
            .iter()
            .map(|i| (i.source, i.days_until_expiry))
            .collect();
        assert_eq!(
            days,
            vec![
                (ItemSource::Document, 0),
                (ItemSource::RightToWork, 90),
                (ItemSource::Training, 30),
            ]
        );
    }

    #[test]
    fn subject_names_month_and_year() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            report_subject("Sunrise Care", date),
            "Monthly Compliance Report - Sunrise Care - March 2025"
        );
    }

    #[test]
    fn request_fields_are_optional() {
        let empty: ReportRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.tenant_id.is_none());
        assert!(!empty.force_email);

        let forced: ReportRequest = serde_json::from_value(json!({ "force_email": true })).unwrap();
        assert!(forced.force_email);
    }
}
