//! CDR record repository implementation
//!
//! Provides PostgreSQL-backed storage for call detail records with
//! window queries on start time and caller/receiver existence checks.
//! Uses runtime queries (not compile-time macros) to avoid requiring
//! database connection at build time.

use cdr_core::{
    models::{CallType, CdrRecord, TimeWindow},
    traits::CdrStore,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, instrument};

/// Rows per INSERT statement; keeps bind parameters well under the protocol limit
const INSERT_CHUNK: usize = 1000;

/// PostgreSQL implementation of CdrStore
pub struct PgCdrRepository {
    pool: PgPool,
}

impl PgCdrRepository {
    /// Create a new CDR repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CDR_SELECT_COLUMNS: &str = r#"
    id, call_type, caller_number, receiver_number, start_time, end_time
"#;

#[async_trait]
impl CdrStore for PgCdrRepository {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn insert_all(&self, records: &[CdrRecord]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Database(format!("Failed to start transaction: {}", e))
        })?;

        for chunk in records.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO cdr_records (call_type, caller_number, receiver_number, start_time, end_time) ",
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.call_type.code())
                    .push_bind(&record.caller_number)
                    .push_bind(&record.receiver_number)
                    .push_bind(record.start_time)
                    .push_bind(record.end_time);
            });

            builder.build().execute(&mut *tx).await.map_err(|e| {
                error!("Database error inserting CDR batch: {}", e);
                AppError::Database(format!("Failed to insert CDRs: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit CDR batch: {}", e);
            AppError::Database(format!("Failed to commit transaction: {}", e))
        })?;

        debug!("Inserted {} CDR records", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self))]
    async fn exists_for_msisdn(&self, msisdn: &str) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM cdr_records WHERE caller_number = $1 OR receiver_number = $1)",
        )
        .bind(msisdn)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking MSISDN {}: {}", msisdn, e);
            AppError::Database(format!("Failed to check MSISDN: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn min_start_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        let result: (Option<DateTime<Utc>>,) =
            sqlx::query_as("SELECT MIN(start_time) FROM cdr_records")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error reading earliest start time: {}", e);
                    AppError::Database(format!("Failed to read earliest start time: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn max_end_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        let result: (Option<DateTime<Utc>>,) =
            sqlx::query_as("SELECT MAX(end_time) FROM cdr_records")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error reading latest end time: {}", e);
                    AppError::Database(format!("Failed to read latest end time: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn find_in_window(&self, window: &TimeWindow) -> AppResult<Vec<CdrRecord>> {
        let query = format!(
            "SELECT {} FROM cdr_records WHERE start_time BETWEEN $1 AND $2 ORDER BY start_time, id",
            CDR_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<Postgres, CdrRow>(&query)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching CDRs in window: {}", e);
                AppError::Database(format!("Failed to fetch CDRs: {}", e))
            })?;

        debug!("Fetched {} CDRs in window", rows.len());
        rows.into_iter().map(CdrRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_for_msisdn_in_window(
        &self,
        msisdn: &str,
        window: &TimeWindow,
    ) -> AppResult<Vec<CdrRecord>> {
        let query = format!(
            r#"
            SELECT {} FROM cdr_records
            WHERE (caller_number = $1 OR receiver_number = $1)
              AND start_time BETWEEN $2 AND $3
            ORDER BY start_time, id
            "#,
            CDR_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<Postgres, CdrRow>(&query)
            .bind(msisdn)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching CDRs for {}: {}", msisdn, e);
                AppError::Database(format!("Failed to fetch CDRs: {}", e))
            })?;

        rows.into_iter().map(CdrRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cdr_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting CDRs: {}", e);
                AppError::Database(format!("Failed to count CDRs: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM cdr_records")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting CDRs: {}", e);
                AppError::Database(format!("Failed to delete CDRs: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct CdrRow {
    id: i64,
    call_type: String,
    caller_number: String,
    receiver_number: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl TryFrom<CdrRow> for CdrRecord {
    type Error = AppError;

    fn try_from(row: CdrRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            call_type: row.call_type.parse::<CallType>()?,
            caller_number: row.caller_number,
            receiver_number: row.receiver_number,
            start_time: row.start_time,
            end_time: row.end_time,
        })
    }
}
