//! # remedy-db: Coupon Store for Remedy Coupons
//!
//! This crate provides database access for the coupon system. It uses
//! PostgreSQL with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Remedy Coupons Data Flow                            │
//! │                                                                         │
//! │  remedy-service (validate_coupon)                                      │
//! │       │  cache miss                                                     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     remedy-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  CouponStore  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ PgPool        │◄───│ trait +       │    │ 001_initial_ │  │   │
//! │  │   │ Connection    │    │ PgCouponStore │    │ schema.sql   │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL: coupons + coupon_usage (append-only ledger)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`store`] - The `CouponStore` trait and its PostgreSQL implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use remedy_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::connect(DbConfig::new(&database_url)).await?;
//!
//! // Use the store
//! let coupon = db.coupons().get_by_code("SAVE10").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use store::{generate_coupon_id, CouponStore, PgCouponStore};
