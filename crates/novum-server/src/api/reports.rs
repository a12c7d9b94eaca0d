//! Scheduled monthly compliance report endpoint.
//!
//! Called by the scheduler with an optional JSON body. Per-tenant
//! failures are inside the 200 response; only a failure to start the
//! run produces `{ success: false, error }` with a 500.
//!
//! An empty body, or a blank `tenant_id`, runs every active tenant. A
//! body that is not a valid request is refused with a 400 in the same
//! `{ success: false, error }` shape rather than widening the run to
//! every tenant.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use novum_report::ReportRequest;
use serde_json::json;

use crate::app::AppState;

pub async fn monthly_compliance_report(State(state): State<AppState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ReportRequest::default()
    } else {
        match serde_json::from_slice::<ReportRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "success": false, "error": format!("invalid request body: {e}") })),
                )
                    .into_response();
            }
        }
    };

    match state.reports.run(request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "monthly compliance report failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.user_message(state.production) })),
            )
                .into_response()
        }
    }
}
