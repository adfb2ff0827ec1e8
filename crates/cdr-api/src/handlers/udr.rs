//! UDR report handlers
//!
//! Report outcomes without data become 404 responses carrying the
//! "No records found ..." text; malformed input is a 400.

use crate::dto::{ApiResponse, ExportCreated, ExportParams, MonthParams, PopulationParams};
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json, Path, Query},
    HttpResponse, Result,
};
use cdr_core::{error::AppError, models::ReportOutcome, models::UdrReport, AppResult};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn found_or_not_found<T>(outcome: ReportOutcome<T>) -> AppResult<T> {
    match outcome {
        ReportOutcome::Found(value) => Ok(value),
        other => Err(AppError::NotFound(
            other.sentinel().unwrap_or_default().to_string(),
        )),
    }
}

fn validate<T: Validate>(params: &T) -> AppResult<()> {
    params.validate().map_err(|e| {
        warn!("Invalid query parameters: {}", e);
        AppError::Validation(e.to_string())
    })
}

/// UDR for one subscriber
///
/// ```text
/// GET /api/v1/udr/79991112233?month=2024-03
/// ```
#[instrument(skip(state, query))]
pub async fn get_udr(
    path: Path<String>,
    query: Query<MonthParams>,
    state: Data<AppState>,
) -> Result<Json<UdrReport>> {
    validate(&*query)?;
    let msisdn = path.into_inner();

    let outcome = state
        .reports
        .single_udr(&msisdn, query.month.as_deref())
        .await?;
    let report = found_or_not_found(outcome)?;

    debug!("UDR for {} built", report.msisdn);
    Ok(Json(report))
}

/// UDR for every subscriber active in a month, one JSON object per line
///
/// ```text
/// GET /api/v1/udr/all?month=2024-03
/// ```
#[instrument(skip(state, query))]
pub async fn get_all_udr(
    query: Query<PopulationParams>,
    state: Data<AppState>,
) -> Result<HttpResponse> {
    validate(&*query)?;

    let body = found_or_not_found(state.reports.population_udr(&query.month).await?)?;

    Ok(HttpResponse::Ok()
        .content_type("application/x-ndjson; charset=utf-8")
        .body(body))
}

/// Export a subscriber's raw CDRs for a period
///
/// ```text
/// GET /api/v1/udr/cdr-report/79991112233?startDate=2024-03-01T00:00:00&endDate=2024-03-31T23:59:59
/// ```
#[instrument(skip(state, query))]
pub async fn cdr_report(
    path: Path<String>,
    query: Query<ExportParams>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<ExportCreated>>> {
    validate(&*query)?;
    let msisdn = path.into_inner();

    let outcome = state
        .reports
        .export_raw(&msisdn, query.start_date, query.end_date)
        .await?;
    let report_id = found_or_not_found(outcome)?;

    info!("CDR report {} generated for {}", report_id, msisdn);
    let message = format!("Report generated with ID: {}", report_id);
    Ok(Json(ApiResponse::with_message(
        ExportCreated { report_id },
        message,
    )))
}

/// Configure UDR routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/udr")
            .route("/all", web::get().to(get_all_udr))
            .route("/cdr-report/{msisdn}", web::get().to(cdr_report))
            .route("/{msisdn}", web::get().to(get_udr)),
    );
}
