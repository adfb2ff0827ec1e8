//! UDR and export DTOs

use cdr_core::models::TimeWindow;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Optional month filter for a single-subscriber UDR
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MonthParams {
    /// `YYYY-MM`; absent means every stored record
    #[validate(custom(function = "validate_month"))]
    pub month: Option<String>,
}

/// Required month for the population UDR
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PopulationParams {
    #[validate(custom(function = "validate_month"))]
    pub month: String,
}

/// Raw CDR export range
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_range"))]
pub struct ExportParams {
    #[serde(rename = "startDate", deserialize_with = "deserialize_datetime")]
    pub start_date: DateTime<Utc>,

    #[serde(rename = "endDate", deserialize_with = "deserialize_datetime")]
    pub end_date: DateTime<Utc>,
}

/// Body of a successful export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportCreated {
    pub report_id: String,
}

/// Optional body for a subscriber reset
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ResetRequest {
    /// Replacement MSISDN list; the configured list is used when absent
    #[validate(length(min = 1, message = "msisdns must not be empty"))]
    pub msisdns: Option<Vec<String>>,
}

fn validate_month(month: &str) -> Result<(), ValidationError> {
    TimeWindow::parse_month(month).map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("month_format");
        error.message = Some("month must be YYYY-MM".into());
        error
    })
}

fn validate_range(params: &ExportParams) -> Result<(), ValidationError> {
    if params.start_date > params.end_date {
        let mut error = ValidationError::new("date_range");
        error.message = Some("startDate must not be after endDate".into());
        return Err(error);
    }
    Ok(())
}

/// Parse `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or RFC 3339
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    parse_datetime(&s).ok_or_else(|| {
        Error::custom(format!(
            "Invalid datetime format: {}. Expected YYYY-MM-DDTHH:MM:SS or RFC 3339",
            s
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-01T10:00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T13:00:00+03:00"), Some(expected));
        assert_eq!(parse_datetime("01.03.2024"), None);
    }

    #[test]
    fn test_month_validation() {
        assert!(MonthParams::default().validate().is_ok());
        assert!(MonthParams {
            month: Some("2024-03".to_string())
        }
        .validate()
        .is_ok());
        assert!(MonthParams {
            month: Some("2024-3x".to_string())
        }
        .validate()
        .is_err());
        assert!(PopulationParams {
            month: "march".to_string()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_export_range_validation() {
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();

        let ok = ExportParams {
            start_date: early,
            end_date: late,
        };
        assert!(ok.validate().is_ok());

        let inverted = ExportParams {
            start_date: late,
            end_date: early,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_export_params_from_query() {
        let params: ExportParams = serde_json::from_value(serde_json::json!({
            "startDate": "2024-03-01T00:00:00",
            "endDate": "2024-03-31T23:59:59Z"
        }))
        .unwrap();
        assert_eq!(params.start_date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }
}
