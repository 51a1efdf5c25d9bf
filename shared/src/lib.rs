//! Shared types for the ledger server
//!
//! Cross-cutting vocabulary used by the server and its tests:
//! - [`error`] — unified error codes, `AppError`, API response envelope
//! - [`models`] — domain enums and request/response DTOs
//! - [`util`] — time helpers

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
