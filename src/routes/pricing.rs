//! Pricing routes
//!
//! Stateless: every call recomputes the breakdown from the inputs it is given.

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::api::DataResponse;
use crate::domain::summary::{share_summary, SummaryRequest, SummaryResponse};
use crate::domain::{calculate, CostBreakdown, JobInputs, ProjectData};

/// Routes that need no application state, so any router can merge them.
pub fn pricing_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/pricing/defaults", get(get_defaults))
        .route("/pricing/calculate", post(calculate_price))
        .route("/pricing/summary", post(summarize))
}

/// GET /pricing/defaults
///
/// Values a fresh calculator form starts with.
pub async fn get_defaults() -> DataResponse<ProjectData> {
    DataResponse::new(ProjectData::form_defaults())
}

/// POST /pricing/calculate
pub async fn calculate_price(Json(inputs): Json<JobInputs>) -> DataResponse<CostBreakdown> {
    let breakdown = calculate(&inputs);

    tracing::debug!(final_price = breakdown.final_price, "Calculated price");

    DataResponse::new(breakdown)
}

/// POST /pricing/summary
///
/// Breakdown plus share text with amounts rounded to cents.
pub async fn summarize(Json(req): Json<SummaryRequest>) -> DataResponse<SummaryResponse> {
    let breakdown = calculate(&req.inputs);
    let text = share_summary(&req.job_name, &req.inputs, &breakdown);

    DataResponse::new(SummaryResponse { text, breakdown })
}
