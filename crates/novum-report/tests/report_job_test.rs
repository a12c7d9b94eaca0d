//! Integration tests for the monthly report job: in-memory SurrealDB for
//! data, a wiremock server standing in for the email API.

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use novum_compliance::{ComplianceConfig, ComplianceService};
use novum_core::clock::FixedClock;
use novum_core::error::NovumError;
use novum_core::models::audit::AuditLogFilter;
use novum_core::models::document::{CreateDocument, ReviewStatus};
use novum_core::models::person::CreatePerson;
use novum_core::models::tenant::{CreateTenant, TenantSettings, UpdateTenant};
use novum_core::models::user_profile::{CreateUserProfile, StaffRole};
use novum_core::repository::{
    AuditLogRepository, ComplianceStore, DocumentRepository, Pagination, PersonRepository,
    TenantRepository, UserProfileRepository,
};
use novum_core::taxonomy::Stage;
use novum_db::SurrealStore;
use novum_report::job::{AUDIT_ACTION, SKIP_EMAIL_NOT_CONFIGURED, SKIP_NOTIFICATIONS_DISABLED};
use novum_report::{
    MailError, Mailer, OutboundEmail, ReportConfig, ReportJob, ReportRequest, ResendMailer,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Store = SurrealStore<Db>;

async fn setup() -> (Arc<Store>, Arc<ComplianceService<Store>>, NaiveDate) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    novum_db::run_migrations(&db).await.unwrap();
    let store = Arc::new(SurrealStore::new(db));

    let today = Utc::now().date_naive();
    let service = ComplianceService::new(
        store.clone(),
        ComplianceConfig::default(),
        Arc::new(FixedClock::on(today)),
    )
    .unwrap();
    (store, Arc::new(service), today)
}

/// A tenant with one carer whose DBS lapses in ten days, an admin and an
/// HR manager with addresses, and an employee who must not be emailed.
async fn seed_tenant(store: &Store, name: &str, emails_enabled: bool, today: NaiveDate) -> Uuid {
    let tenant = store
        .tenants()
        .create(CreateTenant {
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            settings: Some(TenantSettings {
                compliance_email_notifications: emails_enabled,
                ..Default::default()
            }),
        })
        .await
        .unwrap();

    let person = store
        .persons()
        .create(CreatePerson {
            tenant_id: tenant.id,
            first_name: "Florence".into(),
            last_name: "Nightingale".into(),
            email: None,
            job_title: Some("Carer".into()),
            stage: Some(Stage::Ongoing),
            nationality: None,
            requires_nmc: false,
            start_date: None,
        })
        .await
        .unwrap();
    store
        .documents()
        .create(CreateDocument {
            tenant_id: tenant.id,
            person_id: person.id,
            document_type_id: Some("dbs_certificate".into()),
            suggested_type_id: None,
            file_name: "dbs.pdf".into(),
            file_path: None,
            issue_date: None,
            expiry_date: Some(today + Duration::days(10)),
            review_status: ReviewStatus::Verified,
            confidence: Some(100),
            metadata: None,
        })
        .await
        .unwrap();

    let slug = name.to_lowercase().replace(' ', "");
    for (role, email) in [
        (StaffRole::Admin, Some(format!("admin@{slug}.test"))),
        (StaffRole::HrManager, Some(format!("hr@{slug}.test"))),
        (StaffRole::ComplianceOfficer, None),
        (StaffRole::Employee, Some(format!("staff@{slug}.test"))),
    ] {
        store
            .profiles()
            .create(CreateUserProfile {
                tenant_id: tenant.id,
                full_name: format!("{} user", role.as_str()),
                email,
                role,
            })
            .await
            .unwrap();
    }
    tenant.id
}

/// Rejects every email whose subject mentions `fail_for`.
struct FlakyMailer {
    fail_for: String,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl FlakyMailer {
    fn failing_for(name: &str) -> Self {
        Self {
            fail_for: name.into(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl Mailer for FlakyMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        if email.subject.contains(&self.fail_for) {
            return Err(MailError::Rejected {
                status: 500,
                body: "upstream unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[tokio::test]
async fn sends_one_email_per_recipient_through_the_api() {
    let (store, compliance, today) = setup().await;
    let tenant_id = seed_tenant(&store, "Sunrise Care", true, today).await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "from": ReportConfig::default().from,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "e1" })))
        .expect(2)
        .mount(&server)
        .await;

    let mailer = ResendMailer::with_client(reqwest::Client::new(), &server.uri(), "test-key").unwrap();
    let job = ReportJob::new(compliance, Some(mailer), ReportConfig::default());
    let response = job.run(ReportRequest::default()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.message, "Generated 1 compliance reports");
    let report = &response.reports[0];
    assert_eq!(report.tenant_id, tenant_id);
    assert!(report.email_sent);
    assert_eq!(report.recipients, 2);
    assert_eq!(report.emails_sent, 2);
    assert_eq!(report.expiring_items_count, 1);
    let metrics = report.metrics.unwrap();
    assert_eq!(metrics.total_staff, 1);
    assert_eq!(metrics.dbs_expiring, 1);

    let requests = server.received_requests().await.unwrap();
    let mut recipients: Vec<String> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            assert_eq!(
                body["subject"],
                format!("Monthly Compliance Report - Sunrise Care - {}", today.format("%B %Y"))
            );
            assert!(body["html"].as_str().unwrap().contains("Florence Nightingale"));
            body["to"][0].as_str().unwrap().to_string()
        })
        .collect();
    recipients.sort();
    assert_eq!(recipients, vec!["admin@sunrisecare.test", "hr@sunrisecare.test"]);
}

#[tokio::test]
async fn one_tenants_mail_failure_does_not_stop_the_others() {
    let (store, compliance, today) = setup().await;
    seed_tenant(&store, "Alpha", true, today).await;
    let broken = seed_tenant(&store, "Broken", true, today).await;
    seed_tenant(&store, "Gamma", true, today).await;

    let job = ReportJob::new(
        compliance,
        Some(FlakyMailer::failing_for("Broken")),
        ReportConfig::default(),
    );
    let response = job.run(ReportRequest::default()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.reports.len(), 3);
    for report in &response.reports {
        if report.tenant_id == broken {
            assert!(!report.email_sent);
            assert!(report.error.as_deref().unwrap().contains("upstream unavailable"));
            assert!(report.metrics.is_some());
        } else {
            assert!(report.email_sent, "{} should be sent", report.tenant_name);
            assert!(report.error.is_none());
        }
    }

    // The failed tenant is still audited.
    let audit = store
        .audit()
        .list(
            broken,
            AuditLogFilter {
                action: Some(AUDIT_ACTION.into()),
                entity_type: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(audit.items.len(), 1);
    assert_eq!(audit.items[0].metadata["email_sent"], false);
}

#[tokio::test]
async fn disabled_notifications_compute_metrics_without_sending() {
    let (store, compliance, today) = setup().await;
    let tenant_id = seed_tenant(&store, "Quiet Home", false, today).await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mailer = ResendMailer::with_client(reqwest::Client::new(), &server.uri(), "k").unwrap();
    let job = ReportJob::new(compliance, Some(mailer), ReportConfig::default());
    let response = job.run(ReportRequest::default()).await.unwrap();

    let report = &response.reports[0];
    assert_eq!(report.tenant_id, tenant_id);
    assert!(!report.email_sent);
    assert_eq!(report.skipped_reason.as_deref(), Some(SKIP_NOTIFICATIONS_DISABLED));
    assert_eq!(report.metrics.unwrap().total_staff, 1);
}

#[tokio::test]
async fn force_email_overrides_the_tenant_setting() {
    let (store, compliance, today) = setup().await;
    let tenant_id = seed_tenant(&store, "Quiet Home", false, today).await;

    let mailer = FlakyMailer::failing_for("nothing-matches");
    let job = ReportJob::new(compliance, Some(mailer), ReportConfig::default());
    let response = job
        .run(ReportRequest {
            tenant_id: Some(tenant_id),
            force_email: true,
        })
        .await
        .unwrap();

    let report = &response.reports[0];
    assert!(report.email_sent);
    assert!(report.skipped_reason.is_none());
    assert_eq!(report.emails_sent, 2);
}

#[tokio::test]
async fn missing_api_key_still_audits_the_report() {
    let (store, compliance, today) = setup().await;
    let tenant_id = seed_tenant(&store, "Sunrise", true, today).await;

    let job: ReportJob<Store, ResendMailer> =
        ReportJob::new(compliance, None, ReportConfig::default());
    let response = job.run(ReportRequest::default()).await.unwrap();

    let report = &response.reports[0];
    assert!(!report.email_sent);
    assert_eq!(report.skipped_reason.as_deref(), Some(SKIP_EMAIL_NOT_CONFIGURED));

    let audit = store
        .audit()
        .list(tenant_id, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    let row = audit
        .items
        .iter()
        .find(|e| e.action == AUDIT_ACTION)
        .unwrap();
    assert_eq!(row.entity_type, "compliance/monthly_report");
    assert_eq!(row.entity_id.as_deref(), Some(today.format("%Y-%m").to_string().as_str()));
    assert_eq!(row.metadata["metrics"]["dbs_expiring"], 1);
}

#[tokio::test]
async fn inactive_and_unknown_tenants() {
    let (store, compliance, today) = setup().await;
    let active = seed_tenant(&store, "Open", true, today).await;
    let closed = seed_tenant(&store, "Closed", true, today).await;
    store
        .tenants()
        .update(
            closed,
            UpdateTenant {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let job: ReportJob<Store, ResendMailer> =
        ReportJob::new(compliance, None, ReportConfig::default());

    let all = job.run(ReportRequest::default()).await.unwrap();
    assert_eq!(all.reports.len(), 1);
    assert_eq!(all.reports[0].tenant_id, active);

    let targeted = job
        .run(ReportRequest {
            tenant_id: Some(closed),
            force_email: false,
        })
        .await
        .unwrap();
    assert!(targeted.reports.is_empty());

    let err = job
        .run(ReportRequest {
            tenant_id: Some(Uuid::new_v4()),
            force_email: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NovumError::NotFound { .. }));
}
