//! # Service Error Types
//!
//! Errors the transport layer sees from the coupon service.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Outcome vs Error                                  │
//! │                                                                         │
//! │  "coupon not found" / "rule failed"                                    │
//! │       → Ok(ValidationResponse { is_valid: false, reason })             │
//! │       → a normal business outcome, HTTP-success-shaped                 │
//! │                                                                         │
//! │  store unreachable / corrupt row                                       │
//! │       → Err(ServiceError::Store)                                       │
//! │       → transport maps to a server-side failure status, because the    │
//! │         caller cannot distinguish "ineligible" from "unknown"          │
//! │                                                                         │
//! │  cache failures                                                         │
//! │       → never surfaced; swallowed with a warn! and a store read        │
//! │                                                                         │
//! │  duplicate code on create                                              │
//! │       → Err(Store(DuplicateCode)) - a named conflict, not a generic    │
//! │         failure                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use remedy_core::ValidationError;
use remedy_db::StoreError;

/// Errors from coupon service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store failed (unreachable, query error, corrupt row).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An admin-submitted coupon definition violates an invariant.
    #[error("invalid coupon definition: {0}")]
    InvalidDefinition(#[from] ValidationError),

    /// A redemption commit referenced a code that does not exist.
    ///
    /// Distinct from validation's not-found outcome: by commit time the
    /// coupon was already validated, so a missing row is a fault.
    #[error("coupon not found: {0}")]
    UnknownCoupon(String),
}

impl ServiceError {
    /// True when this error is the duplicate-code conflict, which the
    /// transport layer maps to a conflict status rather than a server
    /// failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Store(e) if e.is_duplicate())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
