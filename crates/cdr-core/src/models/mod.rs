//! Domain models for the CDR service
//!
//! This module contains all the core domain models used throughout the application.

pub mod cdr;
pub mod report;
pub mod subscriber;
pub mod window;

pub use cdr::{CallType, CdrRecord};
pub use report::{CallDurations, ReportOutcome, TotalTime, UdrReport};
pub use subscriber::{normalize_msisdn, Subscriber};
pub use window::TimeWindow;
