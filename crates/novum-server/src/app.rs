//! Router composition and the state shared by every handler.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use novum_compliance::{ComplianceService, WorkflowEngine};
use novum_core::clock::Clock;
use novum_db::SurrealStore;
use novum_report::{ReportJob, ResendMailer};
use surrealdb::engine::any::Any;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ServerConfig;

pub type Store = SurrealStore<Any>;

#[derive(Clone)]
pub struct AppState {
    pub compliance: Arc<ComplianceService<Store>>,
    pub workflow: Arc<WorkflowEngine<Store>>,
    pub reports: Arc<ReportJob<Store, ResendMailer>>,
    pub production: bool,
}

impl AppState {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, config: &ServerConfig) -> Result<Self> {
        let compliance = Arc::new(ComplianceService::new(
            store.clone(),
            config.compliance.clone(),
            clock.clone(),
        )?);
        let workflow = Arc::new(WorkflowEngine::new(
            store,
            config.compliance.clone(),
            clock,
        ));

        let mailer = ResendMailer::from_config(&config.mailer)?;
        if mailer.is_none() {
            tracing::warn!("RESEND_API_KEY not set, compliance report emails are disabled");
        }
        let reports = Arc::new(ReportJob::new(
            compliance.clone(),
            mailer,
            config.report.clone(),
        ));

        Ok(Self {
            compliance,
            workflow,
            reports,
            production: config.production,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
            )
        });

    Router::new()
        .route("/v1/system/health", get(api::system::health))
        .route(
            "/functions/v1/monthly-compliance-report",
            post(api::reports::monthly_compliance_report),
        )
        .route(
            "/v1/tenants/:tenant_id/compliance/summary",
            get(api::compliance::tenant_summary),
        )
        .route(
            "/v1/tenants/:tenant_id/compliance/expiring",
            get(api::compliance::expiring_items),
        )
        .route(
            "/v1/tenants/:tenant_id/compliance/workflows/run",
            post(api::compliance::run_workflow),
        )
        .route(
            "/v1/tenants/:tenant_id/persons/:person_id/compliance",
            get(api::compliance::person_compliance),
        )
        .route(
            "/v1/tenants/:tenant_id/documents/classify",
            post(api::documents::classify),
        )
        .layer(trace_layer)
        .with_state(state)
}
