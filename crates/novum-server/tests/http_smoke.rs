//! Router-level tests: requests go through `oneshot` against an
//! in-memory database, no socket is bound.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use novum_core::clock::FixedClock;
use novum_core::models::document::{CreateDocument, ReviewStatus};
use novum_core::models::person::CreatePerson;
use novum_core::models::tenant::CreateTenant;
use novum_core::repository::{
    ComplianceStore, DocumentRepository, PersonRepository, TenantRepository,
};
use novum_core::taxonomy::Stage;
use novum_db::{DbConfig, DbManager, SurrealStore};
use novum_server::app::{AppState, Store, build_router};
use novum_server::config::ServerConfig;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

struct Fixture {
    app: Router,
    tenant_id: Uuid,
    person_id: Uuid,
}

async fn fixture() -> Fixture {
    let db = DbManager::connect(&DbConfig::default()).await.unwrap();
    let store: Arc<Store> = Arc::new(SurrealStore::new(db.client().clone()));
    let today = Utc::now().date_naive();

    let tenant = store
        .tenants()
        .create(CreateTenant {
            name: "Sunrise Care".into(),
            slug: "sunrise-care".into(),
            settings: None,
        })
        .await
        .unwrap();
    let person = store
        .persons()
        .create(CreatePerson {
            tenant_id: tenant.id,
            first_name: "Mary".into(),
            last_name: "Seacole".into(),
            email: None,
            job_title: None,
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

    let state = AppState::new(
        store,
        Arc::new(FixedClock::on(today)),
        &ServerConfig::default(),
    )
    .unwrap();

    Fixture {
        app: build_router(state),
        tenant_id: tenant.id,
        person_id: person.id,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let f = fixture().await;
    let (status, body) = send(&f.app, get("/v1/system/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn tenant_summary_lists_the_expiring_dbs() {
    let f = fixture().await;
    let (status, body) = send(
        &f.app,
        get(&format!("/v1/tenants/{}/compliance/summary?top=5", f.tenant_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_persons"], 1);
    assert_eq!(body["expiring_items"][0]["item_type"], "dbs_certificate");
    assert_eq!(body["expiring_items"][0]["days_until_expiry"], 10);
}

#[tokio::test]
async fn unknown_tenant_is_a_json_404() {
    let f = fixture().await;
    let (status, body) = send(
        &f.app,
        get(&format!("/v1/tenants/{}/compliance/summary", Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn expiring_items_validate_the_window() {
    let f = fixture().await;
    let uri = format!("/v1/tenants/{}/compliance/expiring", f.tenant_id);

    let (status, body) = send(&f.app, get(&format!("{uri}?within_days=30"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&f.app, get(&format!("{uri}?within_days=5"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(&f.app, get(&format!("{uri}?within_days=-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn expiring_items_of_unknown_tenant_is_404() {
    let f = fixture().await;
    let (status, body) = send(
        &f.app,
        get(&format!("/v1/tenants/{}/compliance/expiring", Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn person_compliance_is_tenant_scoped() {
    let f = fixture().await;
    let (status, body) = send(
        &f.app,
        get(&format!(
            "/v1/tenants/{}/persons/{}/compliance",
            f.tenant_id, f.person_id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["person"]["id"], f.person_id.to_string());
    assert!(body["compliance"]["score"].as_u64().unwrap() <= 100);

    let (status, _) = send(
        &f.app,
        get(&format!(
            "/v1/tenants/{}/persons/{}/compliance",
            Uuid::new_v4(),
            f.person_id
        )),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn workflow_run_creates_the_task_once() {
    let f = fixture().await;
    let uri = format!("/v1/tenants/{}/compliance/workflows/run", f.tenant_id);

    let (status, body) = send(&f.app, post(&uri, "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks_created"], 1);

    let (_, body) = send(&f.app, post(&uri, "")).await;
    assert_eq!(body["tasks_created"], 0);
}

#[tokio::test]
async fn classify_previews_a_passport() {
    let f = fixture().await;
    let uri = format!("/v1/tenants/{}/documents/classify", f.tenant_id);
    let input = json!({
        "file_name": "passport.jpg",
        "content": "UNITED KINGDOM OF GREAT BRITAIN PASSPORT\nPassport No: 123456789\nName: Jane Smith\n\
                    Nationality: British Citizen\nDate of birth: 01/02/1990\n\
                    Date of issue: 10 Jan 2025\nDate of expiry: 10 Jan 2035"
    });

    let (status, body) = send(&f.app, post(&uri, &input.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document_type_id"], "rtw_passport");

    let (status, body) = send(&f.app, post(&uri, r#"{"file_name":"  "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn report_job_runs_without_a_mail_key() {
    let f = fixture().await;
    let uri = "/functions/v1/monthly-compliance-report";

    let (status, body) = send(&f.app, post(uri, "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Generated 1 compliance reports");
    assert_eq!(body["reports"][0]["email_sent"], false);
    assert_eq!(body["reports"][0]["skipped_reason"], "email_not_configured");
    assert_eq!(body["reports"][0]["metrics"]["dbs_expiring"], 1);

    let (status, body) = send(
        &f.app,
        post(uri, &json!({ "tenant_id": f.tenant_id }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reports"].as_array().unwrap().len(), 1);

    let (status, body) = send(&f.app, post(uri, r#"{"tenant_id":""}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Generated 1 compliance reports");
}

#[tokio::test]
async fn report_job_failures_are_500_with_success_false() {
    let f = fixture().await;
    let uri = "/functions/v1/monthly-compliance-report";

    let (status, body) = send(
        &f.app,
        post(uri, &json!({ "tenant_id": Uuid::new_v4() }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (status, body) = send(&f.app, post(uri, "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
