//! Subscriber repository implementation

use async_trait::async_trait;
use cdr_core::{models::Subscriber, traits::SubscriberStore, AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of SubscriberStore
pub struct PgSubscriberRepository {
    pool: PgPool,
}

impl PgSubscriberRepository {
    /// Create a new subscriber repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Subscriber>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, msisdn FROM subscribers ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error listing subscribers: {}", e);
                    AppError::Database(format!("Failed to fetch subscribers: {}", e))
                })?;

        Ok(rows
            .into_iter()
            .map(|(id, msisdn)| Subscriber { id, msisdn })
            .collect())
    }

    #[instrument(skip(self, subscriber), fields(msisdn = %subscriber.msisdn))]
    async fn create(&self, subscriber: &Subscriber) -> AppResult<Subscriber> {
        debug!("Creating subscriber");

        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO subscribers (msisdn) VALUES ($1) RETURNING id")
                .bind(&subscriber.msisdn)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error creating subscriber: {}", e);
                    AppError::Database(format!("Failed to create subscriber: {}", e))
                })?;

        Ok(Subscriber {
            id,
            msisdn: subscriber.msisdn.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM subscribers")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting subscribers: {}", e);
                AppError::Database(format!("Failed to delete subscribers: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}
