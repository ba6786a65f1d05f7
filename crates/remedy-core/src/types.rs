//! # Domain Types
//!
//! Core domain types used throughout Remedy Coupons.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌──────────────────┐  │
//! │  │     Coupon      │   │  ValidationRequest  │   │ ValidationResp.  │  │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ──────────────  │  │
//! │  │  id (UUID)      │   │  coupon_code        │   │  is_valid        │  │
//! │  │  code (business)│   │  cart_items         │   │  discount        │  │
//! │  │  expiry_date    │   │  order_total_cents  │   │  message         │  │
//! │  │  discount_value │   │  user_id (optional) │   │  reason          │  │
//! │  └─────────────────┘   └─────────────────────┘   └──────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │    UsageType    │   │  DiscountType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  OneTime        │   │  Percentage     │       │
//! │  │  1000 = 10%     │   │  MultiUse       │   │  Fixed          │       │
//! │  └─────────────────┘   │  TimeBased      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A coupon has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `code`: business identifier - what the shopper types at checkout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage discount rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10%; 10000 bps = 100% (the maximum a coupon may carry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Usage Type
// =============================================================================

/// How often a coupon may be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// Redeemable once per user.
    OneTime,
    /// Redeemable repeatedly, bounded by `max_usage_per_user`.
    MultiUse,
    /// Redeemable only inside the coupon's validity window.
    TimeBased,
}

impl UsageType {
    /// Stable string form, matching the persisted column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UsageType::OneTime => "one_time",
            UsageType::MultiUse => "multi_use",
            UsageType::TimeBased => "time_based",
        }
    }
}

impl FromStr for UsageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(UsageType::OneTime),
            "multi_use" => Ok(UsageType::MultiUse),
            "time_based" => Ok(UsageType::TimeBased),
            other => Err(format!("unknown usage type: {other}")),
        }
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// How `Coupon::discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a rate in basis points (1000 = 10% off).
    Percentage,
    /// `discount_value` is an absolute amount in cents.
    Fixed,
}

impl DiscountType {
    /// Stable string form, matching the persisted column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(format!("unknown discount type: {other}")),
        }
    }
}

// =============================================================================
// Time Window
// =============================================================================

/// A validity window with inclusive bounds.
///
/// Both bounds travel together: a coupon either has a complete window or
/// none at all. The type makes the half-specified state unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TimeWindow {
    /// Checks whether a timestamp falls inside the window.
    ///
    /// Both ends are inclusive: a request arriving at exactly `start_time`
    /// or exactly `end_time` is inside the window.
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_time && at <= self.end_time
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A promotional coupon definition.
///
/// Owned by the store once created; cached copies are disposable and carry
/// no identity beyond their TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier - what the shopper types at checkout. Unique.
    pub code: String,

    /// After this instant the coupon never validates.
    pub expiry_date: DateTime<Utc>,

    /// Redemption cadence.
    pub usage_type: UsageType,

    /// Item ids this coupon applies to.
    pub applicable_medicine_ids: Vec<String>,

    /// Item categories this coupon applies to.
    /// Eligibility is the UNION of ids and categories: an item matches if it
    /// is in either set.
    pub applicable_categories: Vec<String>,

    /// Minimum order total in cents for the coupon to apply.
    pub min_order_cents: i64,

    /// Optional validity window (inclusive both ends).
    /// Required when `usage_type` is `TimeBased`.
    pub valid_time_window: Option<TimeWindow>,

    /// Free-form terms shown to the shopper.
    pub terms_and_conditions: Option<String>,

    /// How `discount_value` is interpreted.
    pub discount_type: DiscountType,

    /// Basis points when `discount_type` is `Percentage`,
    /// cents when `Fixed`.
    pub discount_value: i64,

    /// Per-user redemption cap. 0 means no per-user limit.
    pub max_usage_per_user: i32,

    /// When the coupon was created.
    pub created_at: DateTime<Utc>,

    /// When the coupon was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Returns the minimum order total as Money.
    #[inline]
    pub fn min_order(&self) -> Money {
        Money::from_cents(self.min_order_cents)
    }

    /// Checks if the coupon is expired at the given instant.
    #[inline]
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        at > self.expiry_date
    }

    /// Checks whether a single cart item is eligible for this coupon.
    ///
    /// An item matches if its id is in `applicable_medicine_ids` OR its
    /// category is in `applicable_categories`.
    pub fn applies_to(&self, item: &CartItem) -> bool {
        self.applicable_medicine_ids.iter().any(|id| *id == item.id)
            || self
                .applicable_categories
                .iter()
                .any(|cat| *cat == item.category)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A single line of the shopper's cart, supplied per request. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Item (medicine) identifier.
    pub id: String,

    /// Item category (e.g. "otc", "prescription", "wellness").
    pub category: String,

    /// Unit price in cents.
    pub unit_price_cents: i64,
}

impl CartItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Validation Request
// =============================================================================

/// A request to validate one coupon code against a cart.
///
/// ## Notes
/// - `order_total_cents` is supplied by the caller and trusted to be
///   consistent with the item prices; the engine does not re-derive it.
/// - `timestamp` should be explicit for deterministic testing. When absent,
///   the service resolves it to now at the boundary - the engine itself
///   never reads the clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// The code the shopper entered.
    pub coupon_code: String,

    /// Cart contents, in order.
    pub cart_items: Vec<CartItem>,

    /// Order total in cents.
    pub order_total_cents: i64,

    /// Identity of the shopper, when known. Without it the per-user
    /// usage-limit rule cannot run and is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Evaluation instant. Defaults to now at the service boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ValidationRequest {
    /// Returns the order total as Money.
    #[inline]
    pub fn order_total(&self) -> Money {
        Money::from_cents(self.order_total_cents)
    }
}

// =============================================================================
// Rejection Reason
// =============================================================================

/// Machine-readable reason a coupon failed validation.
///
/// One variant per rule, in rule order. The first failing rule determines
/// the reported reason, so callers can rely on e.g. `Expired` winning over
/// `MinOrderNotMet` for a coupon failing both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// No coupon exists with the requested code.
    NotFound,
    /// The evaluation instant is after the coupon's expiry date.
    Expired,
    /// The order total is below the coupon's minimum.
    MinOrderNotMet,
    /// The evaluation instant is outside the coupon's validity window.
    OutsideTimeWindow,
    /// No cart item matches the coupon's id or category filters.
    NoEligibleItems,
    /// The user has already redeemed this coupon the maximum number of times.
    UsageLimitReached,
}

impl RejectionReason {
    /// Stable machine-readable code, suitable for clients to branch on.
    pub const fn code(&self) -> &'static str {
        match self {
            RejectionReason::NotFound => "not_found",
            RejectionReason::Expired => "expired",
            RejectionReason::MinOrderNotMet => "min_order_not_met",
            RejectionReason::OutsideTimeWindow => "outside_time_window",
            RejectionReason::NoEligibleItems => "no_eligible_items",
            RejectionReason::UsageLimitReached => "usage_limit_reached",
        }
    }
}

/// Human-readable message per reason. Shown to the shopper as-is.
impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectionReason::NotFound => "coupon not found",
            RejectionReason::Expired => "coupon has expired",
            RejectionReason::MinOrderNotMet => "minimum order value not met",
            RejectionReason::OutsideTimeWindow => "coupon not valid at this time",
            RejectionReason::NoEligibleItems => "no applicable items in cart",
            RejectionReason::UsageLimitReached => "maximum usage limit exceeded",
        };
        f.write_str(msg)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// The discount breakdown for a successful validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Discount applied to the item subtotal, in cents.
    pub items_discount_cents: i64,

    /// Discount applied to charges (shipping/fees), in cents.
    /// Always 0 in this version; reserved for future fee discounts.
    pub charges_discount_cents: i64,
}

impl Discount {
    /// A discount on items only (charges discount stays 0).
    #[inline]
    pub const fn on_items(items: Money) -> Self {
        Discount {
            items_discount_cents: items.cents(),
            charges_discount_cents: 0,
        }
    }

    /// Returns the items discount as Money.
    #[inline]
    pub fn items_discount(&self) -> Money {
        Money::from_cents(self.items_discount_cents)
    }
}

// =============================================================================
// Validation Response
// =============================================================================

/// Verdict for one validation request.
///
/// Exactly one of (`discount`, `reason`) is populated, depending on
/// `is_valid`. The constructors below are the only way the engine and the
/// service build responses, which keeps that invariant honest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Whether the coupon applies to this cart.
    pub is_valid: bool,

    /// Discount breakdown, present only when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,

    /// Human-readable outcome message.
    pub message: String,

    /// Machine-readable rejection code, present only when invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
}

impl ValidationResponse {
    /// Builds the success verdict carrying a discount.
    pub fn approved(discount: Discount) -> Self {
        ValidationResponse {
            is_valid: true,
            discount: Some(discount),
            message: "coupon applied successfully".to_string(),
            reason: None,
        }
    }

    /// Builds the rejection verdict for a failed rule.
    pub fn rejected(reason: RejectionReason) -> Self {
        ValidationResponse {
            is_valid: false,
            discount: None,
            message: reason.to_string(),
            reason: Some(reason),
        }
    }
}

// =============================================================================
// Applicable Coupon
// =============================================================================

/// A coarse discovery-listing entry: a coupon that MAY apply to the cart.
///
/// Produced by the store-side pre-filter (unexpired, min-order satisfied,
/// inside window). Not authoritative - full eligibility still requires
/// engine evaluation of the specific code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicableCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_discount_rate_from_bps() {
        let rate = DiscountRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_usage_type_round_trip() {
        for ut in [UsageType::OneTime, UsageType::MultiUse, UsageType::TimeBased] {
            assert_eq!(ut.as_str().parse::<UsageType>().unwrap(), ut);
        }
        assert!("weekly".parse::<UsageType>().is_err());
    }

    #[test]
    fn test_discount_type_round_trip() {
        for dt in [DiscountType::Percentage, DiscountType::Fixed] {
            assert_eq!(dt.as_str().parse::<DiscountType>().unwrap(), dt);
        }
        assert!("bogo".parse::<DiscountType>().is_err());
    }

    #[test]
    fn test_time_window_inclusive_bounds() {
        let window = TimeWindow {
            start_time: ts(100),
            end_time: ts(200),
        };

        assert!(window.contains(ts(100))); // exactly at start
        assert!(window.contains(ts(150)));
        assert!(window.contains(ts(200))); // exactly at end
        assert!(!window.contains(ts(99)));
        assert!(!window.contains(ts(201)));
    }

    #[test]
    fn test_rejection_reason_codes_and_messages() {
        assert_eq!(RejectionReason::MinOrderNotMet.code(), "min_order_not_met");
        assert_eq!(
            RejectionReason::MinOrderNotMet.to_string(),
            "minimum order value not met"
        );
        assert_eq!(RejectionReason::Expired.to_string(), "coupon has expired");
    }

    #[test]
    fn test_response_constructors_keep_invariant() {
        let ok = ValidationResponse::approved(Discount::on_items(Money::from_cents(1500)));
        assert!(ok.is_valid);
        assert!(ok.discount.is_some());
        assert!(ok.reason.is_none());

        let no = ValidationResponse::rejected(RejectionReason::Expired);
        assert!(!no.is_valid);
        assert!(no.discount.is_none());
        assert_eq!(no.reason, Some(RejectionReason::Expired));
        assert_eq!(no.message, "coupon has expired");
    }

    #[test]
    fn test_enum_serde_is_snake_case() {
        let json = serde_json::to_string(&UsageType::OneTime).unwrap();
        assert_eq!(json, r#""one_time""#);

        let json = serde_json::to_string(&RejectionReason::NoEligibleItems).unwrap();
        assert_eq!(json, r#""no_eligible_items""#);
    }
}
