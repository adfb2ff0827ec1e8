//! Synthetic CDR generator
//!
//! Produces a batch of call records for every known subscriber:
//!
//! - 1..=`max_calls_per_subscriber` calls per subscriber (as caller)
//! - start and end inside `[anchor - 1 year, anchor]`
//! - duration in `[min_call_secs, max_call_secs]`
//! - per-caller intervals pairwise disjoint (half-open) within one run
//! - receiver drawn uniformly from the other subscribers
//! - call type drawn independently of the caller/receiver roles
//!
//! Disjointness is only guaranteed inside a single run; repeated runs
//! against the same store may overlap with earlier runs.
//!
//! Every resampling loop is capped at `max_attempts`; exhausting it aborts
//! the run with [`AppError::GenerationExhausted`].

use cdr_core::{
    config::GeneratorConfig,
    models::{CallType, CdrRecord, Subscriber},
    traits::{CdrStore, SubscriberStore},
    AppError, AppResult,
};
use chrono::{DateTime, Duration, Months, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// First hour allowed when daytime bias is enabled
const DAY_START_HOUR: u32 = 8;

/// Hour (exclusive) ending the daytime range
const DAY_END_HOUR: u32 = 22;

/// Outcome of one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub subscribers: usize,
    pub records: usize,
    pub batches: usize,
}

/// CDR generator
pub struct CdrGenerator {
    cdr_store: Arc<dyn CdrStore>,
    subscriber_store: Arc<dyn SubscriberStore>,
    config: GeneratorConfig,
}

impl CdrGenerator {
    /// Create a new generator
    pub fn new(
        cdr_store: Arc<dyn CdrStore>,
        subscriber_store: Arc<dyn SubscriberStore>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            cdr_store,
            subscriber_store,
            config,
        }
    }

    /// Run one generation pass with an RNG built from the configured seed
    /// (or OS entropy when none is set).
    pub async fn run(&self) -> AppResult<GenerationSummary> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(&mut rng, Utc::now()).await
    }

    /// Read subscribers, generate one batch anchored at `anchor`, persist it.
    ///
    /// An empty subscriber set is a no-op: nothing is written.
    #[instrument(skip(self, rng))]
    pub async fn run_with_rng<R: Rng + Send>(
        &self,
        rng: &mut R,
        anchor: DateTime<Utc>,
    ) -> AppResult<GenerationSummary> {
        let subscribers = self.subscriber_store.find_all().await?;

        if subscribers.is_empty() {
            info!("No subscribers found, skipping CDR generation");
            return Ok(GenerationSummary {
                subscribers: 0,
                records: 0,
                batches: 0,
            });
        }

        let records = self.generate(&subscribers, anchor, rng)?;

        let mut persisted = 0;
        let mut batches = 0;
        for batch in records.chunks(self.config.batch_size.max(1)) {
            persisted += self.cdr_store.insert_all(batch).await?;
            batches += 1;
        }

        info!(
            "Generated {} CDRs for {} subscribers in {} batches",
            persisted,
            subscribers.len(),
            batches
        );

        Ok(GenerationSummary {
            subscribers: subscribers.len(),
            records: persisted,
            batches,
        })
    }

    /// Build the record batch without touching the store.
    ///
    /// The result is sorted by start time; records with equal start times
    /// keep generation order.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        subscribers: &[Subscriber],
        anchor: DateTime<Utc>,
        rng: &mut R,
    ) -> AppResult<Vec<CdrRecord>> {
        if subscribers.is_empty() {
            return Ok(Vec::new());
        }

        let distinct: HashSet<&str> = subscribers.iter().map(|s| s.msisdn.as_str()).collect();
        if distinct.len() < 2 {
            warn!("Cannot generate calls with {} distinct subscriber(s)", distinct.len());
            return Err(AppError::SubscriberPoolTooSmall(distinct.len()));
        }

        // Whole seconds, so drawn timestamps never fall below the lower bound
        let anchor = DateTime::<Utc>::from_timestamp(anchor.timestamp(), 0).unwrap_or(anchor);
        let lower = anchor
            .checked_sub_months(Months::new(12))
            .ok_or_else(|| AppError::Internal(format!("anchor {} out of range", anchor)))?;

        // Accepted intervals per caller, scoped to this run
        let mut accepted: HashMap<&str, Vec<(DateTime<Utc>, DateTime<Utc>)>> = HashMap::new();
        let mut records = Vec::new();

        for subscriber in subscribers {
            let caller = subscriber.msisdn.as_str();
            let calls = rng.gen_range(1..=self.config.max_calls_per_subscriber);
            debug!("Generating {} calls for {}", calls, caller);

            for _ in 0..calls {
                let taken = accepted.entry(caller).or_default();
                let (start, end) = self.draw_interval(rng, caller, lower, anchor, taken)?;
                taken.push((start, end));

                let receiver = self.draw_receiver(rng, caller, subscribers)?;
                let call_type = if rng.gen_bool(0.5) {
                    CallType::Outgoing
                } else {
                    CallType::Incoming
                };

                records.push(CdrRecord::new(call_type, caller, receiver, start, end));
            }
        }

        records.sort_by_key(|r| r.start_time);
        Ok(records)
    }

    /// Draw a `[start, end)` interval inside `[lower, anchor]` that does not
    /// intersect any interval in `taken`.
    fn draw_interval<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        caller: &str,
        lower: DateTime<Utc>,
        anchor: DateTime<Utc>,
        taken: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        for _ in 0..self.config.max_attempts {
            let duration =
                Duration::seconds(rng.gen_range(self.config.min_call_secs..=self.config.max_call_secs));
            let latest_start = anchor - duration;
            if latest_start < lower {
                continue;
            }

            let Some(mut start) = DateTime::<Utc>::from_timestamp(
                rng.gen_range(lower.timestamp()..=latest_start.timestamp()),
                0,
            ) else {
                continue;
            };

            if self.config.daytime_bias {
                match Self::shift_into_daytime(rng, start) {
                    Some(shifted) if shifted >= lower && shifted <= latest_start => start = shifted,
                    _ => continue,
                }
            }

            let end = start + duration;
            if !taken.iter().any(|&(s, e)| start < e && s < end) {
                return Ok((start, end));
            }
        }

        warn!(
            "Interval resampling exhausted {} attempts for {}",
            self.config.max_attempts, caller
        );
        Err(AppError::GenerationExhausted {
            msisdn: caller.to_string(),
            attempts: self.config.max_attempts,
        })
    }

    /// Same calendar day, random time in `[08:00, 22:00)`
    fn shift_into_daytime<R: Rng + ?Sized>(
        rng: &mut R,
        start: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        start
            .date_naive()
            .and_hms_opt(
                rng.gen_range(DAY_START_HOUR..DAY_END_HOUR),
                rng.gen_range(0..60),
                rng.gen_range(0..60),
            )
            .map(|naive| naive.and_utc())
    }

    /// Uniform pick among subscribers, resampled until it differs from the caller
    fn draw_receiver<'a, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        caller: &str,
        subscribers: &'a [Subscriber],
    ) -> AppResult<&'a str> {
        for _ in 0..self.config.max_attempts {
            if let Some(candidate) = subscribers.choose(rng) {
                if candidate.msisdn != caller {
                    return Ok(candidate.msisdn.as_str());
                }
            }
        }

        warn!(
            "Receiver resampling exhausted {} attempts for {}",
            self.config.max_attempts, caller
        );
        Err(AppError::GenerationExhausted {
            msisdn: caller.to_string(),
            attempts: self.config.max_attempts,
        })
    }
}
