//! Unified error system
//!
//! - [`ErrorCode`]: standardized error codes, grouped by range
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with code, message and structured details
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error code ranges
//!
//! - 0xxx: general errors
//! - 1xxx: authentication errors
//! - 2xxx: permission errors
//! - 4xxx: sale / billing errors
//! - 6xxx: product / inventory errors
//! - 7xxx: notification errors
//! - 9xxx: system errors

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
