//! Usage report models

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Directional duration totals for one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDurations {
    pub incoming: Duration,
    pub outgoing: Duration,
}

impl Default for CallDurations {
    fn default() -> Self {
        Self {
            incoming: Duration::zero(),
            outgoing: Duration::zero(),
        }
    }
}

/// `{"totalTime": "HH:MM:SS"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalTime {
    pub total_time: String,
}

/// UDR (Usage Detail Record) summary
///
/// Serialized field names are part of the public report format,
/// including the historical `outcomingCall` spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdrReport {
    pub msisdn: String,

    #[serde(rename = "incomingCall")]
    pub incoming_call: TotalTime,

    #[serde(rename = "outcomingCall")]
    pub outcoming_call: TotalTime,
}

/// Result of a report operation
///
/// "No records" is an expected outcome, so it is a discriminant here
/// rather than an error or a magic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome<T> {
    /// Report produced
    Found(T),
    /// The subject MSISDN has no records (or none in the window)
    NoRecordsForMsisdn,
    /// The requested period has no records
    NoRecordsForPeriod,
}

impl<T> ReportOutcome<T> {
    /// Sentinel text for the no-subject outcome
    pub const NO_RECORDS_FOR_MSISDN: &'static str = "No records found for the specified MSISDN.";

    /// Sentinel text for the empty-period outcome
    pub const NO_RECORDS_FOR_PERIOD: &'static str = "No records found for the specified period.";

    /// Returns the report if one was produced
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Sentinel message for the not-found variants
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Self::Found(_) => None,
            Self::NoRecordsForMsisdn => Some(Self::NO_RECORDS_FOR_MSISDN),
            Self::NoRecordsForPeriod => Some(Self::NO_RECORDS_FOR_PERIOD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udr_report_field_names() {
        let report = UdrReport {
            msisdn: "79991112233".to_string(),
            incoming_call: TotalTime {
                total_time: "00:10:00".to_string(),
            },
            outcoming_call: TotalTime {
                total_time: "00:05:00".to_string(),
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["msisdn"], "79991112233");
        assert_eq!(json["incomingCall"]["totalTime"], "00:10:00");
        assert_eq!(json["outcomingCall"]["totalTime"], "00:05:00");
    }

    #[test]
    fn test_outcome_sentinels() {
        assert_eq!(ReportOutcome::<()>::Found(()).sentinel(), None);
        assert_eq!(
            ReportOutcome::<()>::NoRecordsForMsisdn.sentinel(),
            Some("No records found for the specified MSISDN.")
        );
        assert_eq!(
            ReportOutcome::<()>::NoRecordsForPeriod.sentinel(),
            Some("No records found for the specified period.")
        );
    }

    #[test]
    fn test_default_durations_are_zero() {
        let durations = CallDurations::default();
        assert_eq!(durations.incoming, Duration::zero());
        assert_eq!(durations.outgoing, Duration::zero());
    }
}
