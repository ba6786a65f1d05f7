//! # remedy-service: Validation Orchestration for Remedy Coupons
//!
//! This crate composes the coupon cache, the coupon store, and the pure
//! validation engine into the operations the transport layer consumes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Remedy Coupons Request Flow                            │
//! │                                                                         │
//! │  HTTP Transport (outside this workspace)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 remedy-service (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ CouponService │   │  CouponCache   │   │ ServiceConfig│   │   │
//! │  │   │ (service.rs)  │──►│  (cache.rs)    │   │ (config.rs)  │   │   │
//! │  │   │               │   │  Redis/memory  │   │  env-driven  │   │   │
//! │  │   └───────┬───────┘   └────────────────┘   └──────────────┘   │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              │                                                          │
//! │       ┌──────┴──────┐                                                   │
//! │       ▼             ▼                                                   │
//! │  remedy-db     remedy-core                                              │
//! │  (CouponStore) (CouponEngine)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`service`] - The `CouponService` orchestrator
//! - [`cache`] - The `CouponCache` capability (Redis + in-memory)
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Service error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use remedy_db::{Database, DbConfig};
//! use remedy_service::{CouponService, MemoryCouponCache, RedisCouponCache, ServiceConfig};
//!
//! let config = ServiceConfig::load()?;
//! let db = Database::connect(DbConfig::new(&config.database_url)).await?;
//!
//! let cache: Arc<dyn remedy_service::CouponCache> = match &config.redis_url {
//!     Some(url) => Arc::new(RedisCouponCache::connect(url).await?),
//!     None => Arc::new(MemoryCouponCache::new()),
//! };
//!
//! let service = CouponService::new(Arc::new(db.coupons()), cache, &config);
//! let verdict = service.validate_coupon(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod config;
pub mod error;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{CacheError, CouponCache, MemoryCouponCache, RedisCouponCache};
pub use config::{ConfigError, ServiceConfig, DEFAULT_CACHE_TTL_SECS};
pub use error::{ServiceError, ServiceResult};
pub use service::CouponService;
