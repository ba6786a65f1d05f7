//! # Coupon Validation Engine
//!
//! Pure rule evaluation for coupon validation. No I/O, no clock reads - the
//! evaluation instant arrives as an argument, so every verdict is
//! reproducible.
//!
//! ## Rule Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Evaluation Protocol                                  │
//! │                                                                         │
//! │  evaluate(coupon, request, now)                                         │
//! │       │                                                                 │
//! │       ├── 1. Expiry          now > expiry_date?    → Expired           │
//! │       │                                                                 │
//! │       ├── 2. Minimum order   total < min_order?    → MinOrderNotMet    │
//! │       │                                                                 │
//! │       ├── 3. Time window     now outside window?   → OutsideTimeWindow │
//! │       │      (only when the coupon has one; bounds inclusive)          │
//! │       │                                                                 │
//! │       ├── 4. Eligibility     no item matches?      → NoEligibleItems   │
//! │       │      (OR across cart AND across id/category sets)              │
//! │       │                                                                 │
//! │       └── all pass → compute discount → approved                       │
//! │                                                                         │
//! │  Rule 5 (per-user usage limit) needs a store read, so it lives in      │
//! │  the service orchestrator, after this function approves.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The order is part of the contract: each rule has a distinct rejection
//! reason and the FIRST failing rule determines the reported reason.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{
    Coupon, Discount, DiscountRate, DiscountType, RejectionReason, ValidationRequest,
    ValidationResponse,
};

// =============================================================================
// Engine
// =============================================================================

/// The coupon validation engine.
///
/// Stateless apart from configuration; safe to share across request tasks
/// without locking.
///
/// ## Example
/// ```rust
/// use remedy_core::engine::CouponEngine;
///
/// let engine = CouponEngine::default();
/// assert!(!engine.clamp_fixed_to_total);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CouponEngine {
    /// When true, a fixed discount is clamped to the order total so the
    /// discount can never exceed what the shopper would pay. Off by
    /// default: a fixed discount is independent of the order total and
    /// any clamping is left to the pricing layer downstream.
    pub clamp_fixed_to_total: bool,
}

impl CouponEngine {
    /// Creates an engine with explicit configuration.
    pub const fn new(clamp_fixed_to_total: bool) -> Self {
        CouponEngine {
            clamp_fixed_to_total,
        }
    }

    /// Evaluates a coupon against a validation request.
    ///
    /// Applies rules 1-4 in fixed, short-circuiting order and computes the
    /// discount when all pass. Validation is read-only: approving a coupon
    /// here records nothing.
    ///
    /// ## Arguments
    /// * `coupon` - the definition, from cache or store
    /// * `request` - the shopper's cart and order total
    /// * `now` - the evaluation instant (resolved by the caller)
    pub fn evaluate(
        &self,
        coupon: &Coupon,
        request: &ValidationRequest,
        now: DateTime<Utc>,
    ) -> ValidationResponse {
        // Rule 1: expiry
        if coupon.is_expired(now) {
            return ValidationResponse::rejected(RejectionReason::Expired);
        }

        // Rule 2: minimum order value
        if request.order_total() < coupon.min_order() {
            return ValidationResponse::rejected(RejectionReason::MinOrderNotMet);
        }

        // Rule 3: validity window, when the coupon carries one
        if let Some(window) = &coupon.valid_time_window {
            if !window.contains(now) {
                return ValidationResponse::rejected(RejectionReason::OutsideTimeWindow);
            }
        }

        // Rule 4: item eligibility - a single matching item anywhere in the
        // cart qualifies the entire order
        if !request.cart_items.iter().any(|item| coupon.applies_to(item)) {
            return ValidationResponse::rejected(RejectionReason::NoEligibleItems);
        }

        ValidationResponse::approved(self.compute_discount(coupon, request.order_total()))
    }

    /// Computes the discount for a coupon that passed all rules.
    ///
    /// - `Percentage`: order total × rate, integer-rounded in cents
    /// - `Fixed`: the coupon's amount, clamped to the total only when
    ///   `clamp_fixed_to_total` is set
    ///
    /// `charges_discount` is always 0 in this version.
    fn compute_discount(&self, coupon: &Coupon, order_total: Money) -> Discount {
        let items = match coupon.discount_type {
            DiscountType::Percentage => {
                let rate = DiscountRate::from_bps(coupon.discount_value as u32);
                order_total.discount_at(rate)
            }
            DiscountType::Fixed => {
                let amount = Money::from_cents(coupon.discount_value);
                if self.clamp_fixed_to_total {
                    amount.min(order_total)
                } else {
                    amount
                }
            }
        };

        Discount::on_items(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartItem, TimeWindow, UsageType};
    use chrono::{Duration, TimeZone};

    /// Fixed evaluation instant so every test is reproducible.
    fn eval_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn otc_coupon() -> Coupon {
        Coupon {
            id: "7d9f3b1c-1111-4222-8333-444455556666".to_string(),
            code: "SAVE10".to_string(),
            expiry_date: eval_at() + Duration::days(30),
            usage_type: UsageType::MultiUse,
            applicable_medicine_ids: vec![],
            applicable_categories: vec!["otc".to_string()],
            min_order_cents: 10000,
            valid_time_window: None,
            terms_and_conditions: None,
            discount_type: DiscountType::Percentage,
            discount_value: 1000, // 10%
            max_usage_per_user: 3,
            created_at: eval_at() - Duration::days(1),
            updated_at: eval_at() - Duration::days(1),
        }
    }

    fn item(id: &str, category: &str, cents: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            category: category.to_string(),
            unit_price_cents: cents,
        }
    }

    fn request(items: Vec<CartItem>, total_cents: i64) -> ValidationRequest {
        ValidationRequest {
            coupon_code: "SAVE10".to_string(),
            cart_items: items,
            order_total_cents: total_cents,
            user_id: None,
            timestamp: Some(eval_at()),
        }
    }

    #[test]
    fn test_valid_coupon_yields_percentage_discount() {
        let engine = CouponEngine::default();
        let req = request(vec![item("a", "otc", 15000)], 15000);

        let verdict = engine.evaluate(&otc_coupon(), &req, eval_at());

        assert!(verdict.is_valid);
        assert_eq!(verdict.discount.unwrap().items_discount_cents, 1500);
        assert_eq!(verdict.message, "coupon applied successfully");
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_expired_coupon_rejected_regardless_of_other_fields() {
        let engine = CouponEngine::default();
        let mut coupon = otc_coupon();
        coupon.expiry_date = eval_at() - Duration::days(1);

        // Order total below the minimum too; expiry must win because it is
        // checked first.
        let req = request(vec![item("a", "otc", 5000)], 5000);
        let verdict = engine.evaluate(&coupon, &req, eval_at());

        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, Some(RejectionReason::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_not_expired() {
        let engine = CouponEngine::default();
        let mut coupon = otc_coupon();
        coupon.expiry_date = eval_at();

        let req = request(vec![item("a", "otc", 15000)], 15000);
        let verdict = engine.evaluate(&coupon, &req, eval_at());

        // Rejection requires now to be strictly after the expiry date.
        assert!(verdict.is_valid);
    }

    #[test]
    fn test_min_order_checked_before_eligibility() {
        let engine = CouponEngine::default();

        // Cart has NO eligible items AND the total is too low; the reported
        // reason must be the minimum-order rule because it runs first.
        let req = request(vec![item("x", "wellness", 5000)], 5000);
        let verdict = engine.evaluate(&otc_coupon(), &req, eval_at());

        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason, Some(RejectionReason::MinOrderNotMet));
        assert_eq!(verdict.message, "minimum order value not met");
    }

    #[test]
    fn test_min_order_exactly_met_passes() {
        let engine = CouponEngine::default();
        let req = request(vec![item("a", "otc", 10000)], 10000);

        let verdict = engine.evaluate(&otc_coupon(), &req, eval_at());
        assert!(verdict.is_valid);
    }

    #[test]
    fn test_time_window_inclusive_at_both_bounds() {
        let engine = CouponEngine::default();
        let mut coupon = otc_coupon();
        let start = eval_at() - Duration::hours(1);
        let end = eval_at() + Duration::hours(1);
        coupon.usage_type = UsageType::TimeBased;
        coupon.valid_time_window = Some(TimeWindow {
            start_time: start,
            end_time: end,
        });

        let req = request(vec![item("a", "otc", 15000)], 15000);

        // Exactly at the start bound: valid.
        assert!(engine.evaluate(&coupon, &req, start).is_valid);
        // Exactly at the end bound: valid.
        assert!(engine.evaluate(&coupon, &req, end).is_valid);
        // One second past the end: rejected.
        let verdict = engine.evaluate(&coupon, &req, end + Duration::seconds(1));
        assert_eq!(verdict.reason, Some(RejectionReason::OutsideTimeWindow));
        // One second before the start: rejected.
        let verdict = engine.evaluate(&coupon, &req, start - Duration::seconds(1));
        assert_eq!(verdict.reason, Some(RejectionReason::OutsideTimeWindow));
    }

    #[test]
    fn test_eligibility_is_or_across_cart() {
        let engine = CouponEngine::default();

        // One matching item among ten qualifies the whole order.
        let mut items: Vec<CartItem> = (0..9)
            .map(|i| item(&format!("rx-{i}"), "prescription", 1000))
            .collect();
        items.push(item("a", "otc", 6000));

        let req = request(items, 15000);
        let verdict = engine.evaluate(&otc_coupon(), &req, eval_at());

        assert!(verdict.is_valid);
        // The discount applies to the WHOLE order total, not only the
        // matching item.
        assert_eq!(verdict.discount.unwrap().items_discount_cents, 1500);
    }

    #[test]
    fn test_eligibility_matches_by_id_or_category() {
        let engine = CouponEngine::default();
        let mut coupon = otc_coupon();
        coupon.applicable_categories = vec![];
        coupon.applicable_medicine_ids = vec!["med-42".to_string()];

        // Matches by id even though the category does not.
        let req = request(vec![item("med-42", "prescription", 15000)], 15000);
        assert!(engine.evaluate(&coupon, &req, eval_at()).is_valid);

        // No id match and no category match → rejected.
        let req = request(vec![item("med-7", "prescription", 15000)], 15000);
        let verdict = engine.evaluate(&coupon, &req, eval_at());
        assert_eq!(verdict.reason, Some(RejectionReason::NoEligibleItems));
        assert_eq!(verdict.message, "no applicable items in cart");
    }

    #[test]
    fn test_fixed_discount_independent_of_order_total() {
        let engine = CouponEngine::default();
        let mut coupon = otc_coupon();
        coupon.discount_type = DiscountType::Fixed;
        coupon.discount_value = 5000; // $50.00

        for total in [10000, 20000, 100000] {
            let req = request(vec![item("a", "otc", total)], total);
            let verdict = engine.evaluate(&coupon, &req, eval_at());
            assert_eq!(verdict.discount.unwrap().items_discount_cents, 5000);
        }
    }

    #[test]
    fn test_fixed_discount_clamped_when_configured() {
        let engine = CouponEngine::new(true);
        let mut coupon = otc_coupon();
        coupon.discount_type = DiscountType::Fixed;
        coupon.discount_value = 50000; // $500.00, more than the order
        coupon.min_order_cents = 0;

        let req = request(vec![item("a", "otc", 12000)], 12000);
        let verdict = engine.evaluate(&coupon, &req, eval_at());

        assert_eq!(verdict.discount.unwrap().items_discount_cents, 12000);
    }

    #[test]
    fn test_charges_discount_is_always_zero() {
        let engine = CouponEngine::default();
        let req = request(vec![item("a", "otc", 15000)], 15000);
        let verdict = engine.evaluate(&otc_coupon(), &req, eval_at());

        assert_eq!(verdict.discount.unwrap().charges_discount_cents, 0);
    }

    #[test]
    fn test_validation_is_pure() {
        // Same inputs, same verdict - ten times over.
        let engine = CouponEngine::default();
        let coupon = otc_coupon();
        let req = request(vec![item("a", "otc", 15000)], 15000);

        let first = engine.evaluate(&coupon, &req, eval_at());
        for _ in 0..10 {
            let again = engine.evaluate(&coupon, &req, eval_at());
            assert_eq!(again.is_valid, first.is_valid);
            assert_eq!(again.discount, first.discount);
        }
    }
}
