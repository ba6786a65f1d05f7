//! # Validation Module
//!
//! Coupon-definition validation for the admin/create path.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (outside this workspace)                           │
//! │  ├── Request binding / deserialization                                 │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - definition invariants                          │
//! │  ├── percentage rate in (0, 100%]                                      │
//! │  ├── time_based requires a window                                      │
//! │  └── code/field sanity                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (PostgreSQL)                                        │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE(code)                                                      │
//! │  └── window both-or-neither CHECK                                      │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine assumes these invariants hold. A definition that fails here
//! never reaches the store, so the checkout hot path never has to re-check.

use crate::error::ValidationError;
use crate::types::{Coupon, DiscountType, UsageType};
use crate::{MAX_CODE_LENGTH, MAX_DISCOUNT_BPS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Definition Validator
// =============================================================================

/// Validates a complete coupon definition.
///
/// ## Rules
/// - code is present, bounded, and code-shaped
/// - percentage discounts are in (0, 10000] bps
/// - fixed discounts are positive
/// - `time_based` coupons carry a validity window
/// - a window's start is not after its end
/// - `max_usage_per_user` is non-negative (0 = no per-user limit)
///
/// ## Example
/// ```rust,ignore
/// validate_coupon(&coupon)?;
/// store.create(&coupon).await?;
/// ```
pub fn validate_coupon(coupon: &Coupon) -> ValidationResult<()> {
    validate_code(&coupon.code)?;
    validate_discount(coupon.discount_type, coupon.discount_value)?;

    if coupon.usage_type == UsageType::TimeBased && coupon.valid_time_window.is_none() {
        return Err(ValidationError::MissingTimeWindow);
    }

    if let Some(window) = &coupon.valid_time_window {
        if window.start_time > window.end_time {
            return Err(ValidationError::InvertedTimeWindow);
        }
    }

    if coupon.min_order_cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: "min_order_cents".to_string(),
        });
    }

    if coupon.max_usage_per_user < 0 {
        return Err(ValidationError::MustBePositive {
            field: "max_usage_per_user".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a coupon code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 32 characters
/// - Must contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use remedy_core::validation::validate_code;
///
/// assert!(validate_code("SAVE10").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a discount value against its type.
///
/// ## Rules
/// - Percentage: basis points in (0, 10000] - a coupon can discount up to
///   100% of the order, never more
/// - Fixed: cents, strictly positive
pub fn validate_discount(discount_type: DiscountType, value: i64) -> ValidationResult<()> {
    match discount_type {
        DiscountType::Percentage => {
            if value <= 0 || value > MAX_DISCOUNT_BPS as i64 {
                return Err(ValidationError::OutOfRange {
                    field: "discount_value".to_string(),
                    min: 1,
                    max: MAX_DISCOUNT_BPS as i64,
                });
            }
        }
        DiscountType::Fixed => {
            if value <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "discount_value".to_string(),
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
