//! Report rendering
//!
//! Two external representations:
//!
//! - UDR summary: `{"msisdn", "incomingCall": {"totalTime"}, "outcomingCall": {"totalTime"}}`
//!   with `HH:MM:SS` totals (hours unbounded)
//! - flat export rows: `callType,callerNumber,receiverNumber,startTime,endTime`

use cdr_core::{
    models::{CallDurations, CdrRecord, TotalTime, UdrReport},
    AppError, AppResult,
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Render a total as `HH:MM:SS`
///
/// Hours may exceed 24; minutes and seconds are remainders.
pub fn format_total_time(total: Duration) -> String {
    let secs = total.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Build the UDR summary for one subscriber
pub fn udr_report(msisdn: &str, durations: &CallDurations) -> UdrReport {
    UdrReport {
        msisdn: msisdn.to_string(),
        incoming_call: TotalTime {
            total_time: format_total_time(durations.incoming),
        },
        outcoming_call: TotalTime {
            total_time: format_total_time(durations.outgoing),
        },
    }
}

/// Single-line JSON form of a summary
pub fn render_line(report: &UdrReport) -> AppResult<String> {
    Ok(serde_json::to_string(report)?)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// One export row, no trailing newline
pub fn export_line(record: &CdrRecord) -> String {
    format!(
        "{},{},{},{},{}",
        record.call_type,
        record.caller_number,
        record.receiver_number,
        format_timestamp(record.start_time),
        format_timestamp(record.end_time)
    )
}

/// Parse one export row back into a record
pub fn parse_export_line(line: &str) -> AppResult<CdrRecord> {
    let fields: Vec<&str> = line.trim_end().split(',').collect();
    let [call_type, caller, receiver, start, end] = fields.as_slice() else {
        return Err(AppError::InvalidInput(format!(
            "export row must have 5 fields, got {}",
            fields.len()
        )));
    };

    let parse_ts = |value: &str| {
        DateTime::parse_from_rfc3339(value)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| AppError::InvalidInput(format!("bad timestamp {}: {}", value, e)))
    };

    Ok(CdrRecord::new(
        call_type.parse()?,
        *caller,
        *receiver,
        parse_ts(start)?,
        parse_ts(end)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdr_core::models::CallType;
    use chrono::TimeZone;

    #[test]
    fn test_format_total_time() {
        assert_eq!(format_total_time(Duration::zero()), "00:00:00");
        assert_eq!(format_total_time(Duration::minutes(5)), "00:05:00");
        assert_eq!(format_total_time(Duration::seconds(3_725)), "01:02:05");
    }

    #[test]
    fn test_format_total_time_hours_exceed_day() {
        assert_eq!(format_total_time(Duration::hours(30) + Duration::seconds(61)), "30:01:01");
        assert_eq!(format_total_time(Duration::hours(123)), "123:00:00");
    }

    #[test]
    fn test_udr_line() {
        let durations = CallDurations {
            incoming: Duration::minutes(10),
            outgoing: Duration::minutes(5),
        };
        let line = render_line(&udr_report("79991112233", &durations)).unwrap();
        assert_eq!(
            line,
            r#"{"msisdn":"79991112233","incomingCall":{"totalTime":"00:10:00"},"outcomingCall":{"totalTime":"00:05:00"}}"#
        );
    }

    #[test]
    fn test_export_line_field_order() {
        let record = CdrRecord::new(
            CallType::Outgoing,
            "79991112233",
            "79992221122",
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap(),
        );
        assert_eq!(
            export_line(&record),
            "01,79991112233,79992221122,2024-03-01T10:00:00Z,2024-03-01T10:05:00Z"
        );
    }

    #[test]
    fn test_export_round_trip_preserves_order() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let records: Vec<CdrRecord> = (0..4)
            .map(|i| {
                let start = base + Duration::minutes(i * 17);
                CdrRecord::new(
                    if i % 2 == 0 { CallType::Incoming } else { CallType::Outgoing },
                    "111",
                    format!("22{}", i),
                    start,
                    start + Duration::seconds(10 + i * 3),
                )
            })
            .collect();

        let parsed: Vec<CdrRecord> = records
            .iter()
            .map(export_line)
            .map(|line| parse_export_line(&line).unwrap())
            .collect();

        assert_eq!(parsed, records);
    }

    #[test]
    fn test_parse_export_line_rejects_short_rows() {
        assert!(parse_export_line("01,111,222").is_err());
        assert!(parse_export_line("07,111,222,2024-03-01T10:00:00Z,2024-03-01T10:05:00Z").is_err());
    }
}
