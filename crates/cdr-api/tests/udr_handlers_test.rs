//! Integration tests for the HTTP layer
//!
//! Handlers run against the in-memory stores and a temporary export directory.

use actix_web::{http::StatusCode, test, web, App};
use cdr_api::{configure_api, query_config, AppState};
use cdr_core::{
    config::GeneratorConfig,
    models::{CallType, CdrRecord, UdrReport},
    traits::{CdrStore, SubscriberStore},
};
use cdr_db::{InMemoryCdrRepository, InMemorySubscriberRepository};
use cdr_services::{CdrGenerator, DataInitializer, FileExportSink, ReportService};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

const X: &str = "79991112233";
const Y: &str = "79992221122";

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, h, m, 0).unwrap()
}

struct Fixture {
    state: AppState,
    cdrs: Arc<InMemoryCdrRepository>,
    subscribers: Arc<InMemorySubscriberRepository>,
    export_dir: TempDir,
}

async fn fixture(records: Vec<CdrRecord>) -> Fixture {
    let cdrs = Arc::new(InMemoryCdrRepository::new());
    let subscribers = Arc::new(InMemorySubscriberRepository::new());
    cdrs.insert_all(&records).await.unwrap();

    let export_dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FileExportSink::new(export_dir.path()));

    let config = GeneratorConfig {
        max_calls_per_subscriber: 5,
        seed: Some(7),
        ..GeneratorConfig::default()
    };

    let state = AppState {
        reports: Arc::new(ReportService::new(cdrs.clone(), sink)),
        generator: Arc::new(CdrGenerator::new(cdrs.clone(), subscribers.clone(), config)),
        initializer: Arc::new(DataInitializer::new(cdrs.clone(), subscribers.clone())),
        seed_msisdns: Arc::new(vec![X.to_string(), Y.to_string()]),
    };

    Fixture {
        state,
        cdrs,
        subscribers,
        export_dir,
    }
}

fn x_and_y_records() -> Vec<CdrRecord> {
    vec![
        CdrRecord::new(CallType::Outgoing, X, Y, at(1, 10, 0), at(1, 10, 5)),
        CdrRecord::new(CallType::Incoming, X, Y, at(2, 11, 0), at(2, 11, 10)),
    ]
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($fixture.state.clone()))
                .app_data(query_config())
                .configure(configure_api),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_single_udr_for_month() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/udr/{}?month=2024-03", X))
        .to_request();
    let report: UdrReport = test::call_and_read_body_json(&app, req).await;

    assert_eq!(report.msisdn, X);
    assert_eq!(report.outcoming_call.total_time, "00:05:00");
    assert_eq!(report.incoming_call.total_time, "00:00:00");
}

#[actix_rt::test]
async fn test_single_udr_without_month_uses_all_records() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/udr/{}", Y))
        .to_request();
    let report: UdrReport = test::call_and_read_body_json(&app, req).await;

    assert_eq!(report.incoming_call.total_time, "00:10:00");
    assert_eq!(report.outcoming_call.total_time, "00:00:00");
}

#[actix_rt::test]
async fn test_single_udr_unknown_msisdn_is_404() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/70000000000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No records found for the specified MSISDN.");
}

#[actix_rt::test]
async fn test_single_udr_bad_month_is_400() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/udr/{}?month=2024-13", X))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_population_udr_lists_both_subscribers() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/all?month=2024-03")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    let reports: Vec<UdrReport> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(reports.len(), 2);
    let x = reports.iter().find(|r| r.msisdn == X).unwrap();
    let y = reports.iter().find(|r| r.msisdn == Y).unwrap();
    assert_eq!(x.outcoming_call.total_time, "00:05:00");
    assert_eq!(y.incoming_call.total_time, "00:10:00");
}

#[actix_rt::test]
async fn test_population_udr_empty_month_is_404() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/api/v1/udr/all?month=2023-01")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No records found for the specified period.");
}

#[actix_rt::test]
async fn test_population_udr_requires_month() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/udr/all").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_cdr_report_writes_export_file() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/udr/cdr-report/{}?startDate=2024-03-01T00:00:00&endDate=2024-03-31T23:59:59",
            X
        ))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let report_id = body["data"]["report_id"].as_str().unwrap();
    assert_eq!(report_id.len(), 36);
    assert_eq!(
        body["message"],
        format!("Report generated with ID: {}", report_id)
    );

    let path = fx.export_dir.path().join(format!("{}_{}.csv", X, report_id));
    let contents = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "01,79991112233,79992221122,2024-03-01T10:00:00Z,2024-03-01T10:05:00Z",
            "02,79991112233,79992221122,2024-03-02T11:00:00Z,2024-03-02T11:10:00Z",
        ]
    );
}

#[actix_rt::test]
async fn test_cdr_report_empty_period_is_404() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/udr/cdr-report/{}?startDate=2024-05-01T00:00:00&endDate=2024-05-31T23:59:59",
            X
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No records found for the specified period.");
}

#[actix_rt::test]
async fn test_cdr_report_rejects_bad_dates() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let inverted = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/udr/cdr-report/{}?startDate=2024-03-31T00:00:00&endDate=2024-03-01T00:00:00",
            X
        ))
        .to_request();
    assert_eq!(
        test::call_service(&app, inverted).await.status(),
        StatusCode::BAD_REQUEST
    );

    let malformed = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/udr/cdr-report/{}?startDate=yesterday&endDate=2024-03-01T00:00:00",
            X
        ))
        .to_request();
    assert_eq!(
        test::call_service(&app, malformed).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_reset_then_generate() {
    let fx = fixture(x_and_y_records()).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/subscribers/reset")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["subscribers"], 2);
    assert_eq!(fx.cdrs.count().await.unwrap(), 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/cdrs/generate")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let generated = body["data"]["records"].as_i64().unwrap();
    assert!(generated >= 2);
    assert_eq!(fx.cdrs.count().await.unwrap(), generated);
}

#[actix_rt::test]
async fn test_reset_with_explicit_list() {
    let fx = fixture(Vec::new()).await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/api/v1/subscribers/reset")
        .set_json(serde_json::json!({ "msisdns": ["+7 (999) 000-00-01", "79990000002", "79990000003"] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["subscribers"], 3);

    let stored = fx.subscribers.find_all().await.unwrap();
    assert_eq!(stored[0].msisdn, "79990000001");
}

#[actix_rt::test]
async fn test_health() {
    let fx = fixture(Vec::new()).await;
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}
