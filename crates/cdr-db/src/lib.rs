//! CDR Service Database Layer
//!
//! This crate provides the record store implementations for the CDR service:
//!
//! - Connection pool management and schema bootstrap with sqlx
//! - PostgreSQL repositories for CDRs and subscribers
//! - In-memory repositories for development mode and tests

pub mod memory;
pub mod pool;
pub mod repositories;

pub use memory::{InMemoryCdrRepository, InMemorySubscriberRepository};
pub use pool::{create_pool, ensure_schema};
pub use repositories::*;

// Re-export commonly used types
pub use cdr_core::{AppError, AppResult};
pub use sqlx::PgPool;
