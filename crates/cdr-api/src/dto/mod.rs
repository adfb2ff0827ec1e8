//! Data Transfer Objects (DTOs) for API requests and responses

pub mod common;
pub mod udr;

pub use common::*;
pub use udr::*;
