//! In-memory record stores
//!
//! Process-local implementations of the store traits, used for the
//! `memory` storage backend and throughout the test suites. Query
//! semantics match the PostgreSQL repositories.

use async_trait::async_trait;
use cdr_core::{
    models::{CdrRecord, Subscriber, TimeWindow},
    traits::{CdrStore, SubscriberStore},
    AppResult,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory CdrStore
#[derive(Default)]
pub struct InMemoryCdrRepository {
    table: RwLock<Table<CdrRecord>>,
}

impl InMemoryCdrRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record in insertion order
    pub fn all(&self) -> Vec<CdrRecord> {
        self.table.read().rows.clone()
    }

    fn select<F>(&self, predicate: F) -> Vec<CdrRecord>
    where
        F: Fn(&CdrRecord) -> bool,
    {
        let mut found: Vec<CdrRecord> = self
            .table
            .read()
            .rows
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        // stable: equal start times keep insertion order
        found.sort_by_key(|r| r.start_time);
        found
    }
}

#[async_trait]
impl CdrStore for InMemoryCdrRepository {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn insert_all(&self, records: &[CdrRecord]) -> AppResult<usize> {
        let mut table = self.table.write();
        for record in records {
            let id = table.assign_id();
            table.rows.push(CdrRecord {
                id,
                ..record.clone()
            });
        }
        debug!("Inserted {} CDR records in memory", records.len());
        Ok(records.len())
    }

    async fn exists_for_msisdn(&self, msisdn: &str) -> AppResult<bool> {
        Ok(self.table.read().rows.iter().any(|r| r.involves(msisdn)))
    }

    async fn min_start_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.table.read().rows.iter().map(|r| r.start_time).min())
    }

    async fn max_end_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.table.read().rows.iter().map(|r| r.end_time).max())
    }

    async fn find_in_window(&self, window: &TimeWindow) -> AppResult<Vec<CdrRecord>> {
        Ok(self.select(|r| window.contains(r.start_time)))
    }

    async fn find_for_msisdn_in_window(
        &self,
        msisdn: &str,
        window: &TimeWindow,
    ) -> AppResult<Vec<CdrRecord>> {
        Ok(self.select(|r| r.involves(msisdn) && window.contains(r.start_time)))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.table.read().rows.len() as i64)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut table = self.table.write();
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }
}

/// In-memory SubscriberStore
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    table: RwLock<Table<Subscriber>>,
}

impl InMemorySubscriberRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberRepository {
    async fn find_all(&self) -> AppResult<Vec<Subscriber>> {
        Ok(self.table.read().rows.clone())
    }

    async fn create(&self, subscriber: &Subscriber) -> AppResult<Subscriber> {
        let mut table = self.table.write();
        let created = Subscriber {
            id: table.assign_id(),
            msisdn: subscriber.msisdn.clone(),
        };
        table.rows.push(created.clone());
        Ok(created)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut table = self.table.write();
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }
}
