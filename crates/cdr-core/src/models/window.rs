//! Time windows bounding record queries

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Closed interval `[start, end]` on record start times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::InvalidInput(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Whole calendar month: first second through last second
    pub fn for_month(year: i32, month: u32) -> Result<Self, AppError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid month {}-{:02}", year, month)))?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let next = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(|| {
            AppError::InvalidInput(format!("month out of range {}-{:02}", year, month))
        })?;

        let start = Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&next.and_time(chrono::NaiveTime::MIN)) - Duration::seconds(1);
        Ok(Self { start, end })
    }

    /// Parse a `YYYY-MM` month into its window
    pub fn parse_month(month: &str) -> Result<Self, AppError> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
            .map_err(|_| AppError::InvalidInput(format!("month must be YYYY-MM, got {}", month)))?;
        Self::for_month(date.year(), date.month())
    }

    /// Inclusive membership test
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let window = TimeWindow::parse_month("2024-02").unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_december_rolls_over() {
        let window = TimeWindow::for_month(2023, 12).unwrap();
        assert_eq!(window.end, Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(TimeWindow::parse_month("2024-13").is_err());
        assert!(TimeWindow::parse_month("March").is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = TimeWindow::parse_month("2024-03").unwrap();
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + Duration::seconds(1)));
    }

    #[test]
    fn test_new_rejects_inverted() {
        let a = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(TimeWindow::new(a, b).is_err());
        assert!(TimeWindow::new(b, a).is_ok());
    }
}
