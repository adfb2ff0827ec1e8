//! API layer for the CDR service
//!
//! HTTP handlers for UDR reports, raw CDR exports and data generation.
//! Validation of path/query input and the mapping of report outcomes to
//! status codes happen here.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;
pub mod state;

pub use dto::ApiResponse;
pub use handlers::{configure_api, configure_generator, configure_udr, query_config};
pub use state::AppState;
