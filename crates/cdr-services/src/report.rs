//! UDR report service
//!
//! Single-subscriber summaries, month-wide population summaries and raw
//! CDR exports. Every operation normalizes the MSISDN to digits before
//! touching the store; "no records" outcomes come back as
//! [`ReportOutcome`] variants, never as errors.

use crate::{aggregator::aggregate, formatter};
use cdr_core::{
    models::{normalize_msisdn, CdrRecord, ReportOutcome, TimeWindow, UdrReport},
    traits::{CdrStore, ExportSink},
    AppError, AppResult,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Report orchestrator over a record store and an export sink
pub struct ReportService {
    store: Arc<dyn CdrStore>,
    sink: Arc<dyn ExportSink>,
}

impl ReportService {
    /// Create a new report service
    pub fn new(store: Arc<dyn CdrStore>, sink: Arc<dyn ExportSink>) -> Self {
        Self { store, sink }
    }

    /// UDR summary for one subscriber
    ///
    /// With a `YYYY-MM` month the window is that calendar month, otherwise
    /// it spans the earliest start to the latest end in the store.
    #[instrument(skip(self))]
    pub async fn single_udr(
        &self,
        msisdn: &str,
        month: Option<&str>,
    ) -> AppResult<ReportOutcome<UdrReport>> {
        let msisdn = normalize_msisdn(msisdn);

        if !self.store.exists_for_msisdn(&msisdn).await? {
            debug!("No records reference {}", msisdn);
            return Ok(ReportOutcome::NoRecordsForMsisdn);
        }

        let window = match month {
            Some(month) => TimeWindow::parse_month(month)?,
            None => match self.global_window().await? {
                Some(window) => window,
                None => return Ok(ReportOutcome::NoRecordsForMsisdn),
            },
        };

        let records = self.store.find_for_msisdn_in_window(&msisdn, &window).await?;
        if records.is_empty() {
            debug!("No records for {} in window", msisdn);
            return Ok(ReportOutcome::NoRecordsForMsisdn);
        }

        let totals = aggregate(&records, &msisdn);
        Ok(ReportOutcome::Found(formatter::udr_report(&msisdn, &totals)))
    }

    /// One UDR line per subscriber seen in the month
    ///
    /// Lines are newline terminated and sorted by MSISDN.
    #[instrument(skip(self))]
    pub async fn population_udr(&self, month: &str) -> AppResult<ReportOutcome<String>> {
        let window = TimeWindow::parse_month(month)?;
        let records = self.store.find_in_window(&window).await?;
        if records.is_empty() {
            return Ok(ReportOutcome::NoRecordsForPeriod);
        }

        let subjects: BTreeSet<String> = records
            .iter()
            .flat_map(|r| [r.caller_number.clone(), r.receiver_number.clone()])
            .collect();
        let subject_count = subjects.len();
        let records: Arc<Vec<CdrRecord>> = Arc::new(records);

        let mut tasks = JoinSet::new();
        for msisdn in subjects {
            let records = Arc::clone(&records);
            tasks.spawn_blocking(move || {
                let totals = aggregate(&records, &msisdn);
                formatter::render_line(&formatter::udr_report(&msisdn, &totals))
            });
        }

        let mut lines = Vec::with_capacity(subject_count);
        while let Some(joined) = tasks.join_next().await {
            let line = joined.map_err(|e| {
                warn!("Population UDR task failed: {}", e);
                AppError::Internal(format!("aggregation task failed: {}", e))
            })??;
            lines.push(line);
        }
        lines.sort();

        info!(
            "Population UDR for {}: {} subscribers over {} records",
            month,
            subject_count,
            records.len()
        );

        let body = lines.into_iter().fold(String::new(), |mut body, line| {
            body.push_str(&line);
            body.push('\n');
            body
        });
        Ok(ReportOutcome::Found(body))
    }

    /// Export the subscriber's raw CDRs in `[start, end]`, returning the export id
    #[instrument(skip(self))]
    pub async fn export_raw(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<ReportOutcome<String>> {
        let msisdn = normalize_msisdn(msisdn);
        let window = TimeWindow::new(start, end)?;

        if !self.store.exists_for_msisdn(&msisdn).await? {
            return Ok(ReportOutcome::NoRecordsForMsisdn);
        }

        let records = self.store.find_for_msisdn_in_window(&msisdn, &window).await?;
        if records.is_empty() {
            return Ok(ReportOutcome::NoRecordsForPeriod);
        }

        let export_id = Uuid::new_v4().to_string();
        let key = format!("{}_{}", msisdn, export_id);
        let lines: Vec<String> = records.iter().map(formatter::export_line).collect();

        let location = self.sink.write_lines(&key, &lines).await?;
        info!("Exported {} CDRs for {} to {}", lines.len(), msisdn, location);

        Ok(ReportOutcome::Found(export_id))
    }

    async fn global_window(&self) -> AppResult<Option<TimeWindow>> {
        let start = self.store.min_start_time().await?;
        let end = self.store.max_end_time().await?;
        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(TimeWindow::new(start, end)?)),
            _ => Ok(None),
        }
    }
}
