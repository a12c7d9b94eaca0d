//! Integration tests for document versioning and task lifecycle
//! using in-memory SurrealDB.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use novum_core::error::NovumError;
use novum_core::expiry::{ExpiryStatus, ItemSource, Urgency};
use novum_core::models::document::{CreateDocument, ReviewDocument, ReviewStatus};
use novum_core::models::person::CreatePerson;
use novum_core::models::task::{CreateTask, TaskType};
use novum_core::models::tenant::CreateTenant;
use novum_core::models::user_profile::StaffRole;
use novum_core::repository::{
    ComplianceStore, DocumentRepository, PersonRepository, TaskRepository, TenantRepository,
};
use novum_core::taxonomy::Authority;
use novum_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    novum_db::run_migrations(&db).await.unwrap();
    SurrealStore::new(db)
}

/// Tenant plus one person in it.
async fn seed(store: &SurrealStore<Db>, slug: &str) -> (Uuid, Uuid) {
    let tenant = store
        .tenants()
        .create(CreateTenant {
            name: slug.into(),
            slug: slug.into(),
            settings: None,
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
            job_title: None,
            stage: None,
            nationality: None,
            requires_nmc: false,
            start_date: None,
        })
        .await
        .unwrap();
    (tenant.id, person.id)
}

fn doc(tenant_id: Uuid, person_id: Uuid, type_id: Option<&str>, name: &str) -> CreateDocument {
    CreateDocument {
        tenant_id,
        person_id,
        document_type_id: type_id.map(str::to_string),
        suggested_type_id: None,
        file_name: name.into(),
        file_path: Some(format!("compliance/{name}")),
        issue_date: None,
        expiry_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        review_status: if type_id.is_some() {
            ReviewStatus::Uploaded
        } else {
            ReviewStatus::Unclassified
        },
        confidence: Some(80),
        metadata: None,
    }
}

fn task(tenant_id: Uuid, person_id: Uuid, source_id: Uuid) -> CreateTask {
    CreateTask {
        tenant_id,
        person_id,
        source: ItemSource::Document,
        source_id,
        item_type: Some("dbs_certificate".into()),
        task_type: TaskType::DocumentExpiring,
        title: "DBS expiring".into(),
        description: None,
        urgency: Urgency::High,
        assigned_role: StaffRole::ComplianceOfficer,
        due_date: NaiveDate::from_ymd_opt(2026, 3, 1),
    }
}

// -----------------------------------------------------------------------
// Documents
// -----------------------------------------------------------------------

#[tokio::test]
async fn new_version_supersedes_current() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;

    let v1 = store
        .documents()
        .create(doc(t, p, Some("dbs_certificate"), "dbs-2023.pdf"))
        .await
        .unwrap();
    assert_eq!(v1.version, 1);
    assert!(v1.is_current);
    assert_eq!(v1.authority, Some(Authority::Cqc));

    let v2 = store
        .documents()
        .create(doc(t, p, Some("dbs_certificate"), "dbs-2025.pdf"))
        .await
        .unwrap();
    assert_eq!(v2.version, 2);
    assert!(v2.is_current);

    let old = store.documents().get_by_id(t, v1.id).await.unwrap();
    assert!(!old.is_current);

    let current = store.documents().list_current(t).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, v2.id);
}

#[tokio::test]
async fn unclassified_documents_do_not_supersede_each_other() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;

    for name in ["scan-1.pdf", "scan-2.pdf"] {
        let d = store.documents().create(doc(t, p, None, name)).await.unwrap();
        assert_eq!(d.version, 1);
        assert_eq!(d.authority, None);
    }
    assert_eq!(store.documents().list_current(t).await.unwrap().len(), 2);
}

#[tokio::test]
async fn filing_an_unclassified_document_takes_next_version() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;

    let existing = store
        .documents()
        .create(doc(t, p, Some("rtw_passport"), "passport-old.jpg"))
        .await
        .unwrap();
    let scan = store
        .documents()
        .create(doc(t, p, None, "scan.jpg"))
        .await
        .unwrap();

    let filed = store
        .documents()
        .file(t, scan.id, "rtw_passport")
        .await
        .unwrap();
    assert_eq!(filed.document_type_id.as_deref(), Some("rtw_passport"));
    assert_eq!(filed.authority, Some(Authority::HomeOffice));
    assert_eq!(filed.review_status, ReviewStatus::Uploaded);
    assert_eq!(filed.version, 2);
    assert!(filed.is_current);

    let old = store.documents().get_by_id(t, existing.id).await.unwrap();
    assert!(!old.is_current);
}

#[tokio::test]
async fn review_sets_verified_at_only_when_verified() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

    let d = store
        .documents()
        .create(doc(t, p, Some("nmc_pin"), "pin.pdf"))
        .await
        .unwrap();
    let rejected = store
        .documents()
        .review(
            t,
            d.id,
            ReviewDocument {
                review_status: ReviewStatus::Rejected,
                review_notes: Some("Illegible".into()),
            },
            at,
        )
        .await
        .unwrap();
    assert_eq!(rejected.review_status, ReviewStatus::Rejected);
    assert_eq!(rejected.verified_at, None);

    let verified = store
        .documents()
        .review(
            t,
            d.id,
            ReviewDocument {
                review_status: ReviewStatus::Verified,
                review_notes: None,
            },
            at,
        )
        .await
        .unwrap();
    assert_eq!(verified.verified_at, Some(at));
}

#[tokio::test]
async fn document_of_other_tenant_is_not_found() {
    let store = setup().await;
    let (t1, p) = seed(&store, "one").await;
    let (t2, _) = seed(&store, "two").await;

    let d = store
        .documents()
        .create(doc(t1, p, Some("dbs_certificate"), "dbs.pdf"))
        .await
        .unwrap();

    let err = store.documents().get_by_id(t2, d.id).await.unwrap_err();
    assert!(matches!(err, NovumError::NotFound { .. }));

    store
        .documents()
        .set_expiry_status(t2, d.id, ExpiryStatus::Expired)
        .await
        .unwrap();
    let unchanged = store.documents().get_by_id(t1, d.id).await.unwrap();
    assert_eq!(unchanged.expiry_status, None);
}

// -----------------------------------------------------------------------
// Tasks
// -----------------------------------------------------------------------

#[tokio::test]
async fn open_task_is_found_by_source() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;
    let source_id = Uuid::new_v4();

    let created = store.tasks().create(task(t, p, source_id)).await.unwrap();
    assert!(created.is_open());
    assert_eq!(created.escalation_level, 0);

    let found = store
        .tasks()
        .find_open_by_source(t, ItemSource::Document, source_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);

    let missing = store
        .tasks()
        .find_open_by_source(t, ItemSource::Training, source_id)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn escalate_raises_level_and_restarts_sla() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;
    let created = store
        .tasks()
        .create(task(t, p, Uuid::new_v4()))
        .await
        .unwrap();
    let at = created.created_at + Duration::hours(80);

    let escalated = store
        .tasks()
        .escalate(t, created.id, Urgency::Critical, at)
        .await
        .unwrap();
    assert_eq!(escalated.urgency, Urgency::Critical);
    assert_eq!(escalated.escalation_level, 1);
    assert_eq!(escalated.sla_anchor(), at);

    let retiered = store
        .tasks()
        .retier(t, created.id, TaskType::DocumentExpired, Urgency::Critical)
        .await
        .unwrap();
    assert_eq!(retiered.task_type, TaskType::DocumentExpired);
    assert_eq!(retiered.escalation_level, 1);
}

#[tokio::test]
async fn completed_task_leaves_open_lists() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;
    let created = store
        .tasks()
        .create(task(t, p, Uuid::new_v4()))
        .await
        .unwrap();

    let done = store
        .tasks()
        .complete(t, created.id, Some("renewed".into()), Utc::now())
        .await
        .unwrap();
    assert!(!done.is_open());
    assert_eq!(done.closed_reason.as_deref(), Some("renewed"));
    assert!(done.completed_at.is_some());

    assert!(store.tasks().list_open(t).await.unwrap().is_empty());
    assert!(
        store
            .tasks()
            .list_open_for_person(t, p)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn close_open_for_item_counts_closed_tasks() {
    let store = setup().await;
    let (t, p) = seed(&store, "t").await;
    store.tasks().create(task(t, p, Uuid::new_v4())).await.unwrap();
    store.tasks().create(task(t, p, Uuid::new_v4())).await.unwrap();

    let closed = store
        .tasks()
        .close_open_for_item(t, p, "dbs_certificate", "document_replaced", Utc::now())
        .await
        .unwrap();
    assert_eq!(closed, 2);

    let again = store
        .tasks()
        .close_open_for_item(t, p, "dbs_certificate", "document_replaced", Utc::now())
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn task_of_other_tenant_cannot_be_completed() {
    let store = setup().await;
    let (t1, p) = seed(&store, "one").await;
    let (t2, _) = seed(&store, "two").await;
    let created = store
        .tasks()
        .create(task(t1, p, Uuid::new_v4()))
        .await
        .unwrap();

    let err = store
        .tasks()
        .complete(t2, created.id, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, NovumError::NotFound { .. }));
    assert!(store.tasks().get_by_id(t1, created.id).await.unwrap().is_open());
}
