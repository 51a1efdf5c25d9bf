//! Unified error codes for the ledger server
//!
//! Error codes are u16 values for efficient serialization and
//! cross-language compatibility. Ranges:
//! - 0xxx: general
//! - 1xxx: authentication
//! - 2xxx: permission
//! - 4xxx: sale / billing
//! - 6xxx: product / inventory
//! - 7xxx: notification
//! - 9xxx: system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Sale / Billing ====================
    /// Sale not found
    SaleNotFound = 4001,
    /// Receipt document not yet generated
    ReceiptNotAvailable = 4002,
    /// Illegal billing status transition requested
    IllegalBillingTransition = 4003,
    /// Receipt rendering failed
    ReceiptRenderFailed = 4010,
    /// Receipt persistence to the object store failed
    ReceiptPersistFailed = 4011,
    /// Receipt dispatch to the customer failed
    ReceiptDispatchFailed = 4012,

    // ==================== 6xxx: Product / Inventory ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Requested quantity exceeds current inventory
    InsufficientInventory = 6002,
    /// Quantity must be positive
    NonPositiveQuantity = 6003,

    // ==================== 7xxx: Notification ====================
    /// Notification not found
    NotificationNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::NotAuthenticated => "Authentication required",
            Self::PermissionDenied => "Permission denied",
            Self::SaleNotFound => "Sale not found",
            Self::ReceiptNotAvailable => "Receipt not available",
            Self::IllegalBillingTransition => "Illegal billing status transition",
            Self::ReceiptRenderFailed => "Receipt rendering failed",
            Self::ReceiptPersistFailed => "Receipt persistence failed",
            Self::ReceiptDispatchFailed => "Receipt dispatch failed",
            Self::ProductNotFound => "Product not found",
            Self::InsufficientInventory => "Insufficient inventory",
            Self::NonPositiveQuantity => "Quantity must be positive",
            Self::NotificationNotFound => "Notification not found",
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.message(), self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),
            1001 => Ok(Self::NotAuthenticated),
            2001 => Ok(Self::PermissionDenied),
            4001 => Ok(Self::SaleNotFound),
            4002 => Ok(Self::ReceiptNotAvailable),
            4003 => Ok(Self::IllegalBillingTransition),
            4010 => Ok(Self::ReceiptRenderFailed),
            4011 => Ok(Self::ReceiptPersistFailed),
            4012 => Ok(Self::ReceiptDispatchFailed),
            6001 => Ok(Self::ProductNotFound),
            6002 => Ok(Self::InsufficientInventory),
            6003 => Ok(Self::NonPositiveQuantity),
            7001 => Ok(Self::NotificationNotFound),
            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::ConfigError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::NotAuthenticated,
            ErrorCode::InsufficientInventory,
            ErrorCode::ReceiptPersistFailed,
            ErrorCode::DatabaseError,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw).unwrap(), code);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(ErrorCode::try_from(54321), Err(InvalidErrorCode(54321)));
    }
}
