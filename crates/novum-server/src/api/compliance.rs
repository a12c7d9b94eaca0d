//! Read-only compliance views and the on-demand workflow run.

use axum::Json;
use axum::extract::{Path, Query, State};
use novum_compliance::{PersonCompliance, TenantComplianceSummary, WorkflowRunSummary};
use novum_core::expiry::ExpiringItem;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{ApiError, api_error, api_validation_error};
use crate::app::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub top: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub within_days: Option<i64>,
}

pub async fn tenant_summary(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<TenantComplianceSummary>, ApiError> {
    state
        .compliance
        .get_tenant_compliance_summary(tenant_id, query.top)
        .await
        .map(Json)
        .map_err(|e| api_error(&e, state.production))
}

pub async fn expiring_items(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<ExpiringItem>>, ApiError> {
    let within_days = query
        .within_days
        .unwrap_or(state.compliance.config().expiring_horizon_days);
    if within_days < 0 {
        return Err(api_validation_error("within_days must not be negative"));
    }
    state
        .compliance
        .list_expiring_items(tenant_id, within_days)
        .await
        .map(Json)
        .map_err(|e| api_error(&e, state.production))
}

pub async fn person_compliance(
    State(state): State<AppState>,
    Path((tenant_id, person_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PersonCompliance>, ApiError> {
    state
        .compliance
        .get_person_compliance(tenant_id, person_id)
        .await
        .map(Json)
        .map_err(|e| api_error(&e, state.production))
}

pub async fn run_workflow(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<WorkflowRunSummary>, ApiError> {
    state
        .workflow
        .run(tenant_id)
        .await
        .map(Json)
        .map_err(|e| api_error(&e, state.production))
}
