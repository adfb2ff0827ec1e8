//! Data generation handlers

use crate::dto::{ApiResponse, ResetRequest};
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json},
    Result,
};
use cdr_core::error::AppError;
use cdr_services::GenerationSummary;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use validator::Validate;

/// Run one generation pass over the current subscribers
///
/// ```text
/// POST /api/v1/cdrs/generate
/// ```
#[instrument(skip(state))]
pub async fn generate_cdrs(state: Data<AppState>) -> Result<Json<ApiResponse<GenerationSummary>>> {
    let summary = state.generator.run().await?;

    info!("Generation run persisted {} CDRs", summary.records);
    let message = format!("Generated {} CDRs", summary.records);
    Ok(Json(ApiResponse::with_message(summary, message)))
}

/// Delete all data and reseed subscribers
///
/// ```text
/// POST /api/v1/subscribers/reset
/// {"msisdns": ["79991112233", "79992221122"]}
/// ```
#[instrument(skip(state, body))]
pub async fn reset_subscribers(
    state: Data<AppState>,
    body: Option<Json<ResetRequest>>,
) -> Result<Json<ApiResponse<Value>>> {
    let request = body.map(Json::into_inner).unwrap_or_default();
    request.validate().map_err(|e| {
        warn!("Invalid reset request: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let msisdns = request
        .msisdns
        .as_deref()
        .unwrap_or(state.seed_msisdns.as_slice());
    let created = state.initializer.reset_and_seed(msisdns).await?;

    Ok(Json(ApiResponse::with_message(
        json!({ "subscribers": created }),
        format!("Seeded {} subscribers", created),
    )))
}

/// Configure generation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/cdrs/generate", web::post().to(generate_cdrs))
        .route("/subscribers/reset", web::post().to(reset_subscribers));
}
