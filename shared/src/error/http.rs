//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::SaleNotFound
            | Self::ReceiptNotAvailable
            | Self::ProductNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::IllegalBillingTransition
            | Self::ReceiptRenderFailed
            | Self::ReceiptPersistFailed
            | Self::ReceiptDispatchFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            Self::Unknown
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InsufficientInventory
            | Self::NonPositiveQuantity => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InsufficientInventory.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ErrorCode::ProductNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::ReceiptNotAvailable.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn auth_maps_to_401_and_403() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn billing_infrastructure_maps_to_500() {
        assert_eq!(
            ErrorCode::ReceiptPersistFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
