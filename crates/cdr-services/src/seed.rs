//! Reset-then-seed of the subscriber pool

use cdr_core::{
    models::{normalize_msisdn, Subscriber},
    traits::{CdrStore, SubscriberStore},
    AppResult,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Replaces all stored data with a fresh subscriber set
pub struct DataInitializer {
    cdr_store: Arc<dyn CdrStore>,
    subscriber_store: Arc<dyn SubscriberStore>,
}

impl DataInitializer {
    pub fn new(cdr_store: Arc<dyn CdrStore>, subscriber_store: Arc<dyn SubscriberStore>) -> Self {
        Self {
            cdr_store,
            subscriber_store,
        }
    }

    /// Delete every CDR and subscriber, then insert `msisdns`
    ///
    /// Numbers are normalized to digits; blanks and duplicates are skipped.
    /// Returns the number of subscribers created.
    #[instrument(skip(self, msisdns), fields(requested = msisdns.len()))]
    pub async fn reset_and_seed(&self, msisdns: &[String]) -> AppResult<usize> {
        let removed_cdrs = self.cdr_store.delete_all().await?;
        let removed_subscribers = self.subscriber_store.delete_all().await?;
        info!(
            "Reset store: removed {} CDRs and {} subscribers",
            removed_cdrs, removed_subscribers
        );

        let mut seen = HashSet::new();
        let mut created = 0;
        for raw in msisdns {
            let msisdn = normalize_msisdn(raw);
            if msisdn.is_empty() {
                warn!("Skipping MSISDN without digits: {:?}", raw);
                continue;
            }
            if !seen.insert(msisdn.clone()) {
                continue;
            }
            self.subscriber_store
                .create(&Subscriber { id: 0, msisdn })
                .await?;
            created += 1;
        }

        info!("Seeded {} subscribers", created);
        Ok(created)
    }
}
