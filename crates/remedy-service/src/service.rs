//! # Coupon Service
//!
//! The orchestrator: composes Cache → Store → Engine into the operations
//! the transport layer consumes.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             validate_coupon(request)                                    │
//! │                                                                         │
//! │  resolve evaluation instant (request.timestamp or now)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lookup(code):  Cache.get ──miss/err──► Store.get_by_code              │
//! │       │                        │                                        │
//! │       │                        └──► Cache.put (best-effort, TTL)       │
//! │       │                                                                 │
//! │       ├── no coupon → rejected(NotFound)  [business outcome, not Err]  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Engine.evaluate (rules 1-4, pure)                                     │
//! │       │                                                                 │
//! │       ├── rejected → return verdict                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Rule 5: usage_count fresh from the store (never cached), rejected     │
//! │  when the per-user cap is reached                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  approved verdict with discount                                        │
//! │                                                                         │
//! │  Validation is read-only: nothing is recorded here. Redemption is      │
//! │  recorded only by the explicit commit_redemption call after checkout   │
//! │  succeeds.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use remedy_core::{
    validation, ApplicableCoupon, CartItem, Coupon, CouponEngine, Money, RejectionReason,
    ValidationRequest, ValidationResponse,
};
use remedy_db::CouponStore;

use crate::cache::CouponCache;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// Cache key for a coupon code.
fn cache_key(code: &str) -> String {
    format!("coupon:{code}")
}

// =============================================================================
// Service
// =============================================================================

/// The coupon service.
///
/// Holds no per-request state; the only shared state is the injected cache
/// and store, both safe for concurrent use. One instance serves every
/// request-scoped task.
pub struct CouponService {
    store: Arc<dyn CouponStore>,
    cache: Arc<dyn CouponCache>,
    engine: CouponEngine,
    cache_ttl: std::time::Duration,
}

impl CouponService {
    /// Creates a new coupon service from injected capabilities.
    pub fn new(
        store: Arc<dyn CouponStore>,
        cache: Arc<dyn CouponCache>,
        config: &ServiceConfig,
    ) -> Self {
        CouponService {
            store,
            cache,
            engine: config.engine(),
            cache_ttl: config.cache_ttl(),
        }
    }

    /// Validates a coupon code against a cart.
    ///
    /// ## Outcomes
    /// - `Ok(response)` with `is_valid: false` - unknown code or a failed
    ///   rule; a normal business outcome
    /// - `Ok(response)` with `is_valid: true` - the discount breakdown
    /// - `Err(_)` - infrastructure failure (store unreachable, corrupt
    ///   row); the transport maps this to a server-side failure status
    ///
    /// Cache problems never produce `Err` - they degrade to a store read.
    pub async fn validate_coupon(
        &self,
        request: &ValidationRequest,
    ) -> ServiceResult<ValidationResponse> {
        // The engine never reads the clock; resolve the instant here so an
        // explicit request timestamp gives a fully deterministic verdict.
        let now = request.timestamp.unwrap_or_else(Utc::now);

        let Some(coupon) = self.lookup(&request.coupon_code).await? else {
            debug!(code = %request.coupon_code, "Unknown coupon code");
            return Ok(ValidationResponse::rejected(RejectionReason::NotFound));
        };

        let response = self.engine.evaluate(&coupon, request, now);
        if !response.is_valid {
            return Ok(response);
        }

        // Rule 5: per-user usage limit. Lives here rather than in the pure
        // engine because it needs a store read - and that read must be
        // fresh per request, never cached, or concurrent redemptions could
        // race past the cap unnoticed.
        if coupon.max_usage_per_user > 0 {
            match &request.user_id {
                Some(user_id) => {
                    let used = self.store.usage_count(&coupon.code, user_id).await?;
                    if used >= i64::from(coupon.max_usage_per_user) {
                        return Ok(ValidationResponse::rejected(
                            RejectionReason::UsageLimitReached,
                        ));
                    }
                }
                None => {
                    warn!(
                        code = %coupon.code,
                        "Request carries no user identity; skipping per-user usage check"
                    );
                }
            }
        }

        Ok(response)
    }

    /// Lists coupons that MAY apply to the cart (coarse store-side
    /// pre-filter). Not authoritative - validate the specific code before
    /// pricing with it.
    pub async fn applicable_coupons(
        &self,
        cart_items: &[CartItem],
        order_total: Money,
    ) -> ServiceResult<Vec<ApplicableCoupon>> {
        Ok(self
            .store
            .applicable_coupons(cart_items, order_total, Utc::now())
            .await?)
    }

    /// Creates a new coupon (admin path).
    ///
    /// Validates the definition invariants, stamps identity and audit
    /// timestamps, and inserts. A duplicate code surfaces as the named
    /// conflict, not a generic failure.
    pub async fn create_coupon(&self, mut coupon: Coupon) -> ServiceResult<Coupon> {
        validation::validate_coupon(&coupon)?;

        if coupon.id.is_empty() {
            coupon.id = Uuid::new_v4().to_string();
        }
        let now = Utc::now();
        coupon.created_at = now;
        coupon.updated_at = now;

        self.store.create(&coupon).await?;

        info!(code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    /// Records one redemption for (code, user), respecting the per-user
    /// cap.
    ///
    /// Called by the checkout flow AFTER the order succeeds - validation
    /// itself records nothing. Returns whether the redemption was recorded;
    /// `false` means the user hit the cap, which a concurrent attempt may
    /// have consumed since validation.
    pub async fn commit_redemption(&self, code: &str, user_id: &str) -> ServiceResult<bool> {
        // Consult the store directly: the cached copy may be stale and this
        // is the one place the limit must actually hold.
        let coupon = self
            .store
            .get_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::UnknownCoupon(code.to_string()))?;

        if coupon.max_usage_per_user > 0 {
            let recorded = self
                .store
                .record_usage_within_limit(code, user_id, coupon.max_usage_per_user)
                .await?;
            if !recorded {
                warn!(code = %code, user_id = %user_id, "Redemption refused: per-user cap reached");
            }
            Ok(recorded)
        } else {
            self.store.record_usage(code, user_id).await?;
            Ok(true)
        }
    }

    /// Cache-aside coupon lookup.
    ///
    /// Any cache problem - read failure, undecodable payload, write
    /// failure - degrades to the store with a `warn!`; the store remains
    /// the source of truth.
    async fn lookup(&self, code: &str) -> ServiceResult<Option<Coupon>> {
        let key = cache_key(code);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Coupon>(&bytes) {
                Ok(coupon) => {
                    debug!(code = %code, "Coupon served from cache");
                    return Ok(Some(coupon));
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "Discarding undecodable cached coupon")
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(code = %code, error = %e, "Coupon cache read failed; falling back to store")
            }
        }

        let Some(coupon) = self.store.get_by_code(code).await? else {
            return Ok(None);
        };

        // Best-effort write-back; a failure costs the next request a store
        // read, nothing more.
        match serde_json::to_vec(&coupon) {
            Ok(bytes) => {
                if let Err(e) = self.cache.put(&key, &bytes, self.cache_ttl).await {
                    warn!(code = %code, error = %e, "Coupon cache write failed");
                }
            }
            Err(e) => warn!(code = %code, error = %e, "Failed to serialize coupon for cache"),
        }

        Ok(Some(coupon))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
