//! Typed client for the certification portal HTTP API.

mod client;
mod error;
pub mod types;

pub use client::{ApiClient, USER_AGENT};
pub use error::{ApiError, ApiErrorKind};
pub use types::*;
