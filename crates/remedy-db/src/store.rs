//! # Coupon Store
//!
//! The `CouponStore` contract and its PostgreSQL implementation.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CouponStore Operations                            │
//! │                                                                         │
//! │  create(coupon)          insert; DuplicateCode on UNIQUE violation    │
//! │  get_by_code(code)       Option<Coupon> - None is "no such coupon",   │
//! │                          Err is "lookup failed"; callers MUST be      │
//! │                          able to tell these apart                      │
//! │  applicable_coupons(..)  coarse discovery pre-filter, not             │
//! │                          authoritative                                 │
//! │  record_usage(..)        append one ledger row (no upsert)            │
//! │  usage_count(..)         fresh count per request, never cached        │
//! │  record_usage_within_limit(..)                                         │
//! │                          conditional append for redemption commit      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trait is object-safe so the service can hold `Arc<dyn CouponStore>`
//! and tests can substitute fakes with call counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use remedy_core::{ApplicableCoupon, CartItem, Coupon, Money, TimeWindow};

// =============================================================================
// Store Contract
// =============================================================================

/// Durable record of coupon definitions and per-user redemption history.
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Inserts a new coupon definition.
    ///
    /// Fails with [`StoreError::DuplicateCode`] if the code already exists -
    /// the constraint violation is surfaced, not silently ignored.
    async fn create(&self, coupon: &Coupon) -> StoreResult<()>;

    /// Looks up a coupon by its business code.
    ///
    /// `Ok(None)` means "no such coupon" and is distinct from a transport
    /// error.
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Coupon>>;

    /// Coarse store-side pre-filter for coupon discovery: unexpired,
    /// minimum order satisfied, inside the validity window if any.
    ///
    /// A convenience listing, not authoritative - full eligibility still
    /// requires engine evaluation per code (cart items are not inspected
    /// here).
    async fn applicable_coupons(
        &self,
        cart_items: &[CartItem],
        order_total: Money,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ApplicableCoupon>>;

    /// Appends one usage record for (code, user).
    ///
    /// Safe to call concurrently for the same pair; every call produces a
    /// new row, counted by [`usage_count`](CouponStore::usage_count).
    async fn record_usage(&self, code: &str, user_id: &str) -> StoreResult<()>;

    /// Counts usage records for (code, user).
    async fn usage_count(&self, code: &str, user_id: &str) -> StoreResult<i64>;

    /// Appends one usage record only if the current count is below `limit`.
    ///
    /// Returns whether a record was written. This is the redemption-commit
    /// primitive: the check and the insert happen in a single statement, so
    /// concurrent commits cannot both slip past the limit the way a
    /// separate count-then-insert would.
    async fn record_usage_within_limit(
        &self,
        code: &str,
        user_id: &str,
        limit: i32,
    ) -> StoreResult<bool>;
}

// =============================================================================
// Row Types
// =============================================================================

/// Raw `coupons` row. Enum columns come back as TEXT and the validity
/// window as two nullable timestamps; [`TryFrom`] turns this into the
/// domain type.
#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: String,
    code: String,
    expiry_date: DateTime<Utc>,
    usage_type: String,
    applicable_medicine_ids: Vec<String>,
    applicable_categories: Vec<String>,
    min_order_cents: i64,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    terms_and_conditions: Option<String>,
    discount_type: String,
    discount_value: i64,
    max_usage_per_user: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = StoreError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let usage_type = row
            .usage_type
            .parse()
            .map_err(|e| StoreError::Internal(format!("coupon {}: {e}", row.code)))?;
        let discount_type = row
            .discount_type
            .parse()
            .map_err(|e| StoreError::Internal(format!("coupon {}: {e}", row.code)))?;

        // The schema CHECK guarantees both-or-neither; a mixed pair here
        // means the row predates the constraint and cannot be trusted.
        let valid_time_window = match (row.valid_from, row.valid_until) {
            (Some(start_time), Some(end_time)) => Some(TimeWindow {
                start_time,
                end_time,
            }),
            (None, None) => None,
            _ => {
                return Err(StoreError::Internal(format!(
                    "coupon {}: half-specified validity window",
                    row.code
                )))
            }
        };

        Ok(Coupon {
            id: row.id,
            code: row.code,
            expiry_date: row.expiry_date,
            usage_type,
            applicable_medicine_ids: row.applicable_medicine_ids,
            applicable_categories: row.applicable_categories,
            min_order_cents: row.min_order_cents,
            valid_time_window,
            terms_and_conditions: row.terms_and_conditions,
            discount_type,
            discount_value: row.discount_value,
            max_usage_per_user: row.max_usage_per_user,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicableCouponRow {
    code: String,
    discount_type: String,
    discount_value: i64,
}

impl TryFrom<ApplicableCouponRow> for ApplicableCoupon {
    type Error = StoreError;

    fn try_from(row: ApplicableCouponRow) -> Result<Self, Self::Error> {
        let discount_type = row
            .discount_type
            .parse()
            .map_err(|e| StoreError::Internal(format!("coupon {}: {e}", row.code)))?;

        Ok(ApplicableCoupon {
            code: row.code,
            discount_type,
            discount_value: row.discount_value,
        })
    }
}

// =============================================================================
// PostgreSQL Implementation
// =============================================================================

/// Coupon store backed by a PostgreSQL pool.
///
/// ## Usage
/// ```rust,ignore
/// let store = PgCouponStore::new(pool);
/// let coupon = store.get_by_code("SAVE10").await?;
/// ```
#[derive(Debug, Clone)]
pub struct PgCouponStore {
    pool: PgPool,
}

impl PgCouponStore {
    /// Creates a new PgCouponStore.
    pub fn new(pool: PgPool) -> Self {
        PgCouponStore { pool }
    }
}

#[async_trait]
impl CouponStore for PgCouponStore {
    async fn create(&self, coupon: &Coupon) -> StoreResult<()> {
        debug!(code = %coupon.code, "Inserting coupon");

        let (valid_from, valid_until) = match &coupon.valid_time_window {
            Some(window) => (Some(window.start_time), Some(window.end_time)),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, expiry_date, usage_type,
                applicable_medicine_ids, applicable_categories,
                min_order_cents, valid_from, valid_until,
                terms_and_conditions, discount_type, discount_value,
                max_usage_per_user, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4,
                $5, $6,
                $7, $8, $9,
                $10, $11, $12,
                $13, $14, $15
            )
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.expiry_date)
        .bind(coupon.usage_type.as_str())
        .bind(&coupon.applicable_medicine_ids)
        .bind(&coupon.applicable_categories)
        .bind(coupon.min_order_cents)
        .bind(valid_from)
        .bind(valid_until)
        .bind(&coupon.terms_and_conditions)
        .bind(coupon.discount_type.as_str())
        .bind(coupon.discount_value)
        .bind(coupon.max_usage_per_user)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Attach the conflicting code; the generic From impl cannot
            // know it.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    return StoreError::duplicate(&coupon.code);
                }
            }
            e.into()
        })?;

        Ok(())
    }

    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT
                id, code, expiry_date, usage_type,
                applicable_medicine_ids, applicable_categories,
                min_order_cents, valid_from, valid_until,
                terms_and_conditions, discount_type, discount_value,
                max_usage_per_user, created_at, updated_at
            FROM coupons
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Coupon::try_from).transpose()
    }

    async fn applicable_coupons(
        &self,
        _cart_items: &[CartItem],
        order_total: Money,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ApplicableCoupon>> {
        debug!(order_total = %order_total, "Listing applicable coupons");

        let rows = sqlx::query_as::<_, ApplicableCouponRow>(
            r#"
            SELECT code, discount_type, discount_value
            FROM coupons
            WHERE expiry_date > $2
              AND min_order_cents <= $1
              AND (
                  valid_from IS NULL
                  OR ($2 BETWEEN valid_from AND valid_until)
              )
            ORDER BY code
            "#,
        )
        .bind(order_total.cents())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ApplicableCoupon::try_from).collect()
    }

    async fn record_usage(&self, code: &str, user_id: &str) -> StoreResult<()> {
        debug!(code = %code, user_id = %user_id, "Recording coupon usage");

        sqlx::query(
            r#"
            INSERT INTO coupon_usage (coupon_code, user_id, used_at)
            VALUES ($1, $2, NOW())
            "#,
        )
        .bind(code)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn usage_count(&self, code: &str, user_id: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM coupon_usage
            WHERE coupon_code = $1 AND user_id = $2
            "#,
        )
        .bind(code)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn record_usage_within_limit(
        &self,
        code: &str,
        user_id: &str,
        limit: i32,
    ) -> StoreResult<bool> {
        debug!(code = %code, user_id = %user_id, limit = %limit, "Conditional usage insert");

        // Single-statement check-and-insert: the count subquery and the
        // insert see one snapshot, so two concurrent commits at the limit
        // cannot both append a row the way separate count + insert calls
        // could.
        let result = sqlx::query(
            r#"
            INSERT INTO coupon_usage (coupon_code, user_id, used_at)
            SELECT $1, $2, NOW()
            WHERE (
                SELECT COUNT(*)
                FROM coupon_usage
                WHERE coupon_code = $1 AND user_id = $2
            ) < $3
            "#,
        )
        .bind(code)
        .bind(user_id)
        .bind(limit as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Helper to generate a new coupon ID.
///
/// ## Usage
/// ```rust,ignore
/// let id = generate_coupon_id();
/// let coupon = Coupon { id, ... };
/// ```
pub fn generate_coupon_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(valid_from: Option<i64>, valid_until: Option<i64>) -> CouponRow {
        let ts = |secs| Utc.timestamp_opt(secs, 0).unwrap();
        CouponRow {
            id: "id-1".to_string(),
            code: "SAVE10".to_string(),
            expiry_date: ts(2_000_000),
            usage_type: "multi_use".to_string(),
            applicable_medicine_ids: vec![],
            applicable_categories: vec!["otc".to_string()],
            min_order_cents: 10000,
            valid_from: valid_from.map(ts),
            valid_until: valid_until.map(ts),
            terms_and_conditions: None,
            discount_type: "percentage".to_string(),
            discount_value: 1000,
            max_usage_per_user: 3,
            created_at: ts(1_000_000),
            updated_at: ts(1_000_000),
        }
    }

    #[test]
    fn test_row_converts_to_coupon() {
        let coupon = Coupon::try_from(row(Some(100), Some(200))).unwrap();
        assert_eq!(coupon.code, "SAVE10");
        assert!(coupon.valid_time_window.is_some());

        let coupon = Coupon::try_from(row(None, None)).unwrap();
        assert!(coupon.valid_time_window.is_none());
    }

    #[test]
    fn test_half_specified_window_is_rejected() {
        let err = Coupon::try_from(row(Some(100), None)).unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
    }

    #[test]
    fn test_unknown_enum_text_is_rejected() {
        let mut bad = row(None, None);
        bad.usage_type = "weekly".to_string();
        assert!(Coupon::try_from(bad).is_err());

        let mut bad = row(None, None);
        bad.discount_type = "bogo".to_string();
        assert!(Coupon::try_from(bad).is_err());
    }

    #[test]
    fn test_generate_coupon_id_is_uuid() {
        let id = generate_coupon_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
