//! Repository implementations
//!
//! Concrete PostgreSQL implementations of the store traits defined in
//! cdr-core, using sqlx.

pub mod cdr_repo;
pub mod subscriber_repo;

pub use cdr_repo::PgCdrRepository;
pub use subscriber_repo::PgSubscriberRepository;
