//! HTTP request handlers

pub mod generator;
pub mod health;
pub mod udr;

use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;

pub use generator::configure as configure_generator;
pub use health::health_check;
pub use udr::configure as configure_udr;

/// Query extractor config turning deserialization failures into 400 JSON
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({
                "error": "invalid_query",
                "message": message,
                "status": 400
            })),
        )
        .into()
    })
}

/// All API routes under `/api/v1`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_udr)
            .configure(configure_generator),
    );
}
