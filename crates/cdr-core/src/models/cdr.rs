//! CDR (Call Detail Record) model
//!
//! Represents one synthetic call event between two subscribers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Call type label
///
/// A perspective label attached when the record is created. It is not
/// derived from which party is the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallType {
    /// Code "01"
    #[serde(rename = "01")]
    Outgoing,
    /// Code "02"
    #[serde(rename = "02")]
    Incoming,
}

impl CallType {
    /// Wire/storage code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Outgoing => "01",
            Self::Incoming => "02",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CallType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "01" => Ok(Self::Outgoing),
            "02" => Ok(Self::Incoming),
            other => Err(AppError::InvalidInput(format!("unknown call type: {}", other))),
        }
    }
}

/// Call Detail Record
///
/// Immutable once generated. `end_time > start_time` and
/// `caller_number != receiver_number` hold for every generated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdrRecord {
    /// Store-assigned identifier (0 until persisted)
    #[serde(skip)]
    pub id: i64,

    /// Perspective label
    pub call_type: CallType,

    /// Calling party MSISDN
    pub caller_number: String,

    /// Called party MSISDN
    pub receiver_number: String,

    /// Call start timestamp
    pub start_time: DateTime<Utc>,

    /// Call end timestamp
    pub end_time: DateTime<Utc>,
}

impl CdrRecord {
    /// Build an unsaved record
    pub fn new(
        call_type: CallType,
        caller_number: impl Into<String>,
        receiver_number: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            call_type,
            caller_number: caller_number.into(),
            receiver_number: receiver_number.into(),
            start_time,
            end_time,
        }
    }

    /// Call duration (`end_time - start_time`)
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether the MSISDN is the caller or the receiver
    #[inline]
    pub fn involves(&self, msisdn: &str) -> bool {
        self.caller_number == msisdn || self.receiver_number == msisdn
    }

    /// Half-open `[start, end)` intersection test
    #[inline]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && self.start_time < end
    }
}
