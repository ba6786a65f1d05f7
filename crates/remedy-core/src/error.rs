//! # Error Types
//!
//! Domain-specific error types for remedy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  remedy-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Coupon definition validation failures          │
//! │                                                                         │
//! │  remedy-db errors (separate crate)                                     │
//! │  └── StoreError       - Database operation failures                    │
//! │                                                                         │
//! │  remedy-service errors (separate crate)                                │
//! │  └── ServiceError     - What the transport layer sees                  │
//! │                                                                         │
//! │  Note: a coupon FAILING a rule is NOT an error - that is a normal      │
//! │  ValidationResponse with is_valid=false. Errors here are definition    │
//! │  problems caught on the admin/create path.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, field, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent domain logic failures. They should be caught and
/// translated to user-friendly messages by the transport layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coupon cannot be found.
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Coupon definition validation errors.
///
/// These errors occur when an admin-submitted coupon definition doesn't meet
/// the invariants the engine relies on. Used for early validation before the
/// definition reaches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid code characters, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A time window's bounds are inverted or incomplete.
    #[error("valid_time_window start must not be after end")]
    InvertedTimeWindow,

    /// A time-based coupon was submitted without a validity window.
    #[error("time_based coupons require a valid_time_window")]
    MissingTimeWindow,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CouponNotFound("SAVE10".to_string());
        assert_eq!(err.to_string(), "Coupon not found: SAVE10");

        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::OutOfRange {
            field: "discount_value".to_string(),
            min: 1,
            max: 10000,
        };
        assert_eq!(
            err.to_string(),
            "discount_value must be between 1 and 10000"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MissingTimeWindow;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
