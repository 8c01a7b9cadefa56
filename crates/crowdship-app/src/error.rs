//! # API Error Type
//!
//! Unified error type returned by every service call.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Crowdship                              │
//! │                                                                         │
//! │  Mobile shell                Rust services                              │
//! │  ────────────                ─────────────                              │
//! │                                                                         │
//! │  orders.acceptOrder(id)                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage Error? ─── DbError::QueryFailed("...") ───┐             │  │
//! │  │         │            (logged, generic message)     │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Rule Error? ─── CoreError::Forbidden ────────── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) {                                                            │
//! │    // e.code = "FORBIDDEN"                                              │
//! │    // e.message = "Only delivery partners can accept orders"            │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use crowdship_core::{CoreError, ValidationError};
use crowdship_db::DbError;

use crate::config::ConfigError;
use crate::services::location::LocationError;

/// Error returned from service calls.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 8c1f…"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// No signed-in user
    Unauthenticated,

    /// Wrong role, or not the order's owner/partner
    Forbidden,

    /// Order or record not found
    NotFound,

    /// Order status does not allow the action
    InvalidTransition,

    /// Concurrent writers kept winning; retry later
    Conflict,

    /// Local storage failed
    StorageError,

    /// Device location unavailable or denied
    LocationError,

    /// Configuration could not be loaded
    ConfigError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates a location error.
    pub fn location(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::LocationError, message)
    }
}

/// Converts storage errors to API errors.
///
/// Details are logged here; the caller only sees a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::VersionConflict { key, expected } => {
                error!(key = %key, expected, "Write conflict surfaced to caller");
                ApiError::conflict("Data was changed elsewhere, please try again")
            }
            DbError::Serialization(e) => {
                error!("Stored value could not be encoded/decoded: {}", e);
                ApiError::new(ErrorCode::StorageError, "Could not read or write saved data")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::StorageError, "Database operation failed")
            }
        }
    }
}

/// Converts domain errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Unauthenticated => ApiError::new(ErrorCode::Unauthenticated, message),
            CoreError::Forbidden { .. } => ApiError::new(ErrorCode::Forbidden, message),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::InvalidTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, message)
            }
            CoreError::Validation(_) => ApiError::validation(message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<LocationError> for ApiError {
    fn from(err: LocationError) -> Self {
        ApiError::location(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdship_core::{OrderAction, OrderStatus};

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Order", "o-1");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: o-1");
    }

    #[test]
    fn test_core_error_mapping() {
        let forbidden: ApiError = CoreError::forbidden("Only delivery partners can accept orders").into();
        assert_eq!(forbidden.code, ErrorCode::Forbidden);
        assert_eq!(forbidden.message, "Only delivery partners can accept orders");

        let transition: ApiError = CoreError::InvalidTransition {
            order_id: "o-1".to_string(),
            status: OrderStatus::Delivered,
            action: OrderAction::Cancel,
        }
        .into();
        assert_eq!(transition.code, ErrorCode::InvalidTransition);
        assert_eq!(transition.message, "Order o-1 is delivered, cannot cancel");

        let unauthenticated: ApiError = CoreError::Unauthenticated.into();
        assert_eq!(unauthenticated.code, ErrorCode::Unauthenticated);
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err: ApiError = DbError::QueryFailed("no such table: kv_store".to_string()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("kv_store"));

        let conflict: ApiError = DbError::conflict("orders", 3).into();
        assert_eq!(conflict.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_error_code_wire_names() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "\"INVALID_TRANSITION\"");
    }
}
