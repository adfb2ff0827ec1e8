//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub generator: GeneratorConfig,
    pub reports: ReportsConfig,
    pub bootstrap: BootstrapConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL (required for the postgres backend)
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Record store backend selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL via sqlx
    Postgres,
    /// Process-local store, lost on restart
    #[default]
    Memory,
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// CDR generator configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// Records per bulk insert
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound for calls drawn per subscriber (lower bound is 1)
    #[serde(default = "default_max_calls")]
    pub max_calls_per_subscriber: u32,

    /// Shortest call duration in seconds
    #[serde(default = "default_min_call_secs")]
    pub min_call_secs: i64,

    /// Longest call duration in seconds
    #[serde(default = "default_max_call_secs")]
    pub max_call_secs: i64,

    /// Resample cap per call before the run is aborted
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Restrict call start hour to [8, 22)
    #[serde(default)]
    pub daytime_bias: bool,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_batch_size() -> usize {
    100
}

fn default_max_calls() -> u32 {
    100
}

fn default_min_call_secs() -> i64 {
    10
}

fn default_max_call_secs() -> i64 {
    7200
}

fn default_max_attempts() -> u32 {
    10_000
}

/// Report export configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory receiving `{msisdn}_{exportId}.csv` files
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_export_dir() -> String {
    "reports".to_string()
}

/// Startup data initialization
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    /// Delete all CDRs and subscribers, then seed `msisdns`
    #[serde(default = "default_true")]
    pub reset_on_startup: bool,

    /// Run one generation pass after seeding
    #[serde(default = "default_true")]
    pub generate_on_startup: bool,

    /// Subscribers created by the seed step
    #[serde(default = "default_msisdns")]
    pub msisdns: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_msisdns() -> Vec<String> {
    [
        "79991112233",
        "79992221122",
        "79993334455",
        "79994445566",
        "79995556677",
        "79996667788",
        "79997778899",
        "79998889900",
        "79990001122",
        "79991113344",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("storage.backend", "memory")?
            .set_default("generator.batch_size", 100)?
            .set_default("generator.max_calls_per_subscriber", 100)?
            .set_default("generator.min_call_secs", 10)?
            .set_default("generator.max_call_secs", 7200)?
            .set_default("generator.max_attempts", 10_000)?
            .set_default("generator.daytime_bias", false)?
            .set_default("reports.export_dir", "reports")?
            .set_default("bootstrap.reset_on_startup", true)?
            .set_default("bootstrap.generate_on_startup", true)?
            .set_default("bootstrap.msisdns", default_msisdns())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with CDR_ prefix
            .add_source(
                Environment::with_prefix("CDR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bootstrap.msisdns")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        tracing::debug!(backend = ?app_config.storage.backend, "Configuration loaded");
        Ok(app_config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("CDR").separator("__"))
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject settings the generator and stores cannot honour
    fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Message(
                "database.url is required for the postgres backend".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Message(
                "generator.batch_size must be positive".to_string(),
            ));
        }
        if self.max_calls_per_subscriber == 0 {
            return Err(ConfigError::Message(
                "generator.max_calls_per_subscriber must be positive".to_string(),
            ));
        }
        if self.min_call_secs <= 0 || self.min_call_secs > self.max_call_secs {
            return Err(ConfigError::Message(format!(
                "invalid call duration range [{}, {}]",
                self.min_call_secs, self.max_call_secs
            )));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Message(
                "generator.max_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_calls_per_subscriber: default_max_calls(),
            min_call_secs: default_min_call_secs(),
            max_call_secs: default_max_call_secs(),
            max_attempts: default_max_attempts(),
            daytime_bias: false,
            seed: None,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            reset_on_startup: true,
            generate_on_startup: true,
            msisdns: default_msisdns(),
        }
    }
}
