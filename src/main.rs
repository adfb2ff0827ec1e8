//! CDR Service
//!
//! Generates synthetic call detail records and serves UDR reports and raw
//! CDR exports over HTTP.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use cdr_api::{configure_api, query_config, AppState};
use cdr_core::{
    config::StorageBackend,
    traits::{CdrStore, SubscriberStore},
    AppConfig,
};
use cdr_db::{
    create_pool, ensure_schema, InMemoryCdrRepository, InMemorySubscriberRepository,
    PgCdrRepository, PgSubscriberRepository,
};
use cdr_services::{CdrGenerator, DataInitializer, FileExportSink, ReportService};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cdr_service={0},cdr_api={0},cdr_services={0},cdr_db={0},actix_web=info,sqlx=warn",
            log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Build the record stores for the configured backend
async fn open_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn CdrStore>, Arc<dyn SubscriberStore>)> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("database.url must be set for the postgres backend")?;

            info!("Connecting to database...");
            let pool = create_pool(url, Some(config.database.max_connections)).await?;
            ensure_schema(&pool).await?;
            info!(
                "Database connection established with {} max connections",
                config.database.max_connections
            );

            Ok((
                Arc::new(PgCdrRepository::new(pool.clone())),
                Arc::new(PgSubscriberRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(InMemoryCdrRepository::new()),
                Arc::new(InMemorySubscriberRepository::new()),
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting CDR Service v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;
    let (cdr_store, subscriber_store) = open_stores(&config).await?;

    let sink = Arc::new(FileExportSink::new(&config.reports.export_dir));
    let state = AppState {
        reports: Arc::new(ReportService::new(cdr_store.clone(), sink)),
        generator: Arc::new(CdrGenerator::new(
            cdr_store.clone(),
            subscriber_store.clone(),
            config.generator.clone(),
        )),
        initializer: Arc::new(DataInitializer::new(cdr_store, subscriber_store)),
        seed_msisdns: Arc::new(config.bootstrap.msisdns.clone()),
    };

    if config.bootstrap.reset_on_startup {
        let seeded = state
            .initializer
            .reset_and_seed(&config.bootstrap.msisdns)
            .await?;
        info!("Startup reset seeded {} subscribers", seeded);
    }

    if config.bootstrap.generate_on_startup {
        let summary = state.generator.run().await?;
        info!(
            "Startup generation: {} CDRs for {} subscribers",
            summary.records, summary.subscribers
        );
    }

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers (exports in {})",
        bind_addr, config.server.workers, config.reports.export_dir
    );

    let data = web::Data::new(state);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(data.clone())
            .app_data(query_config())
            // Middleware
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_api)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
