//! Business logic services for the CDR service
//!
//! This crate contains the synthetic CDR generator and the UDR report
//! engine built on top of the store traits from cdr-core.
//!
//! # Services
//!
//! - `CdrGenerator` - per-subscriber, non-overlapping synthetic call records
//! - `aggregator` - directional (incoming/outgoing) duration totals
//! - `formatter` - UDR summary and flat export rendering
//! - `ReportService` - single, population and raw-export report operations
//! - `FileExportSink` - writes exports as `{msisdn}_{exportId}.csv`
//! - `DataInitializer` - explicit reset-then-seed of subscribers

pub mod aggregator;
pub mod export;
pub mod formatter;
pub mod generator;
pub mod report;
pub mod seed;

pub use aggregator::aggregate;
pub use export::FileExportSink;
pub use generator::{CdrGenerator, GenerationSummary};
pub use report::ReportService;
pub use seed::DataInitializer;
