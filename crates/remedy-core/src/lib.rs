//! # remedy-core: Pure Business Logic for Remedy Coupons
//!
//! This crate is the **heart** of the coupon system. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Remedy Coupons Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP Transport (outside this workspace)            │   │
//! │  │    POST /coupons/validate ── GET /coupons/applicable ── ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              remedy-service (orchestration)                     │   │
//! │  │    Cache.get ──miss──► Store.get_by_code ──► Cache.put         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ remedy-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  engine   │  │ validation│  │   │
//! │  │   │  Coupon   │  │   Money   │  │  rules    │  │ definition│  │   │
//! │  │   │  CartItem │  │  bps math │  │  discount │  │ invariants│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Coupon, CartItem, ValidationRequest, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`engine`] - The coupon validation engine (rules 1-4 + discount math)
//! - [`validation`] - Coupon-definition validation for the admin path
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - the evaluation
//!    timestamp is an argument, never `Utc::now()`
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors; percentage rates are basis points
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use remedy_core::Coupon` instead of
// `use remedy_core::types::Coupon`

pub use engine::CouponEngine;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a coupon code.
///
/// ## Business Reason
/// Codes are typed by shoppers at checkout and printed on flyers; anything
/// longer than this is a data-entry error, not a campaign.
pub const MAX_CODE_LENGTH: usize = 32;

/// Maximum percentage discount in basis points (100%).
///
/// A coupon may discount the full order but can never pay the shopper.
pub const MAX_DISCOUNT_BPS: u32 = 10_000;
