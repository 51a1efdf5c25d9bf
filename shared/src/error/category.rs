//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category, derived from the error code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Sale / billing errors (4xxx)
    Sale,
    /// Product / inventory errors (6xxx)
    Product,
    /// Notification errors (7xxx)
    Notification,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from a raw code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Sale,
            6000..7000 => Self::Product,
            7000..8000 => Self::Notification,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Category of this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
