//! Duration aggregation
//!
//! Reduces CDRs to incoming/outgoing totals for one subscriber:
//! an OUTGOING record counts when the subscriber is the caller, an
//! INCOMING record counts when the subscriber is the receiver. Any other
//! combination is ignored, because the call type is a label and not a
//! role derived from the parties.

use cdr_core::models::{CallDurations, CallType, CdrRecord};

/// Sum durations for `msisdn` over `records`
///
/// Order independent; an empty input yields zero/zero.
pub fn aggregate(records: &[CdrRecord], msisdn: &str) -> CallDurations {
    records
        .iter()
        .fold(CallDurations::default(), |mut totals, record| {
            match record.call_type {
                CallType::Outgoing if record.caller_number == msisdn => {
                    totals.outgoing = totals.outgoing + record.duration();
                }
                CallType::Incoming if record.receiver_number == msisdn => {
                    totals.incoming = totals.incoming + record.duration();
                }
                _ => {}
            }
            totals
        })
}
