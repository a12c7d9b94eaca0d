//! Document classification preview.

use axum::Json;
use axum::extract::{Path, State};
use novum_compliance::{Classification, ClassificationInput};
use novum_core::repository::{ComplianceStore, TenantRepository};
use uuid::Uuid;

use crate::api::error::{ApiError, api_error, api_validation_error};
use crate::app::AppState;

/// Classify a document without storing it.
pub async fn classify(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(input): Json<ClassificationInput>,
) -> Result<Json<Classification>, ApiError> {
    if input.file_name.trim().is_empty() {
        return Err(api_validation_error("file_name is required"));
    }
    state
        .compliance
        .store()
        .tenants()
        .get_by_id(tenant_id)
        .await
        .map_err(|e| api_error(&e, state.production))?;

    Ok(Json(state.compliance.classify(&input)))
}
