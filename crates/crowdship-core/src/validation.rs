//! # Validation Module
//!
//! Input validation for credentials and order drafts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile shell                                                 │
//! │  ├── Empty-field checks on forms                                       │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (Rust)                                              │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: rule validation, before any state change             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Lifecycle                                                    │
//! │  └── Role / ownership / status checks (lifecycle.rs)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use crowdship_core::validation::{validate_email, validate_password};
//!
//! assert!(validate_email("ana@example.com").is_ok());
//! assert!(validate_password("").is_err());
//! ```

use crate::error::ValidationError;
use crate::geo::Coordinates;
use crate::money::Money;
use crate::types::{DeliveryLocation, OrderDraft};
use crate::{MAX_ADDRESS_LENGTH, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_ORDER_AMOUNT_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Credential Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - At most 254 characters
/// - Exactly one '@' with a non-empty local part and a dotted domain
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    Ok(())
}

/// Validates a password. Only presence is checked; there is no credential
/// store to check it against.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

/// Validates that the confirmation matches the password.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> ValidationResult<()> {
    if confirmation.is_empty() {
        return Err(ValidationError::required("confirmPassword"));
    }
    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates a display name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a coordinate pair.
pub fn validate_coordinates(field: &str, coordinates: Coordinates) -> ValidationResult<()> {
    if !coordinates.latitude.is_finite() || !(-90.0..=90.0).contains(&coordinates.latitude) {
        return Err(ValidationError::OutOfRange {
            field: format!("{}.latitude", field),
            min: "-90".to_string(),
            max: "90".to_string(),
        });
    }

    if !coordinates.longitude.is_finite() || !(-180.0..=180.0).contains(&coordinates.longitude) {
        return Err(ValidationError::OutOfRange {
            field: format!("{}.longitude", field),
            min: "-180".to_string(),
            max: "180".to_string(),
        });
    }

    Ok(())
}

/// Validates a pickup or delivery location.
///
/// ## Rules
/// - Address must not be empty and at most 200 characters
/// - Coordinates must be in range
pub fn validate_location(field: &str, location: &DeliveryLocation) -> ValidationResult<()> {
    let address = location.address.trim();

    if address.is_empty() {
        return Err(ValidationError::required(format!("{}.address", field)));
    }

    if address.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::TooLong {
            field: format!("{}.address", field),
            max: MAX_ADDRESS_LENGTH,
        });
    }

    validate_coordinates(field, location.coordinates())
}

/// Validates an order amount.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed the per-order ceiling
pub fn validate_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    if amount.cents() > MAX_ORDER_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: Money::from_cents(1).to_string(),
            max: Money::from_cents(MAX_ORDER_AMOUNT_CENTS).to_string(),
        });
    }

    Ok(())
}

/// Validates a complete order draft.
pub fn validate_order_draft(draft: &OrderDraft) -> ValidationResult<()> {
    validate_location("pickupLocation", &draft.pickup_location)?;
    validate_location("deliveryLocation", &draft.delivery_location)?;
    validate_amount(draft.amount)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageSize;

    fn draft() -> OrderDraft {
        OrderDraft {
            pickup_location: DeliveryLocation::new("p", 40.7128, -74.0060, "City Hall"),
            delivery_location: DeliveryLocation::new("d", 40.7580, -73.9855, "Times Square"),
            package_size: PackageSize::Small,
            amount: Money::from_cents(1500),
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("  ana@example.com  ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("ana@@example.com").is_err());
        assert!(validate_email("a na@example.com").is_err());
    }

    #[test]
    fn test_validate_password_confirmation() {
        assert!(validate_password_confirmation("secret", "secret").is_ok());
        assert!(matches!(
            validate_password_confirmation("secret", "other"),
            Err(ValidationError::Mismatch { .. })
        ));
        assert!(matches!(
            validate_password_confirmation("secret", ""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ana").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_order_draft() {
        assert!(validate_order_draft(&draft()).is_ok());

        let mut missing_address = draft();
        missing_address.delivery_location.address = " ".to_string();
        assert_eq!(
            validate_order_draft(&missing_address).unwrap_err(),
            ValidationError::required("deliveryLocation.address")
        );

        let mut bad_latitude = draft();
        bad_latitude.pickup_location.latitude = 120.0;
        assert!(matches!(
            validate_order_draft(&bad_latitude),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Money::from_cents(1)).is_ok());
        assert!(validate_amount(Money::zero()).is_err());
        assert!(validate_amount(Money::from_cents(-100)).is_err());
        assert!(validate_amount(Money::from_cents(MAX_ORDER_AMOUNT_CENTS + 1)).is_err());
    }
}
