//! Collaborator traits
//!
//! Abstractions over the record store and the export sink. The report and
//! generation services only ever talk to these traits.

use crate::error::AppError;
use crate::models::{CdrRecord, Subscriber, TimeWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// CDR record store
///
/// Query results are ordered by start time, then insertion order.
#[async_trait]
pub trait CdrStore: Send + Sync {
    /// Bulk insert; atomic per call
    async fn insert_all(&self, records: &[CdrRecord]) -> Result<usize, AppError>;

    /// Whether any record has the MSISDN as caller or receiver
    async fn exists_for_msisdn(&self, msisdn: &str) -> Result<bool, AppError>;

    /// Earliest start time across all records
    async fn min_start_time(&self) -> Result<Option<DateTime<Utc>>, AppError>;

    /// Latest end time across all records
    async fn max_end_time(&self) -> Result<Option<DateTime<Utc>>, AppError>;

    /// Records whose start time falls in the window
    async fn find_in_window(&self, window: &TimeWindow) -> Result<Vec<CdrRecord>, AppError>;

    /// Records in the window where the MSISDN is caller or receiver
    async fn find_for_msisdn_in_window(
        &self,
        msisdn: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CdrRecord>, AppError>;

    /// Count all records
    async fn count(&self) -> Result<i64, AppError>;

    /// Remove every record (full reset only)
    async fn delete_all(&self) -> Result<u64, AppError>;
}

/// Subscriber store
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// All subscribers in insertion order
    async fn find_all(&self) -> Result<Vec<Subscriber>, AppError>;

    /// Insert one subscriber, returning it with its assigned id
    async fn create(&self, subscriber: &Subscriber) -> Result<Subscriber, AppError>;

    /// Remove every subscriber (full reset only)
    async fn delete_all(&self) -> Result<u64, AppError>;
}

/// Destination for raw CDR exports
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Write all lines under `key`, returning the sink location.
    ///
    /// Any failure is reported as [`AppError::ExportIo`].
    async fn write_lines(&self, key: &str, lines: &[String]) -> Result<String, AppError>;
}
