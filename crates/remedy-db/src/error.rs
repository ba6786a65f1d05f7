//! # Store Error Types
//!
//! Error types for coupon store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (remedy-service) ← What the transport layer maps to     │
//! │  a server-side failure status                                          │
//! │                                                                         │
//! │  NOTE: "no such coupon" is NOT an error - GetByCode returns            │
//! │  Ok(None). StoreError means the lookup itself failed.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Coupon store operation errors.
///
/// These errors wrap sqlx errors and provide additional context for
/// debugging and caller feedback.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A coupon with this code already exists.
    ///
    /// ## When This Occurs
    /// - Creating a coupon whose code violates UNIQUE(code)
    ///
    /// Surfaced as a named conflict so the admin path can report it
    /// precisely instead of a generic failure.
    #[error("Coupon code '{code}' already exists")]
    DuplicateCode { code: String },

    /// Entity not found where one was required.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database unreachable
    /// - Bad credentials / connection string
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal store error (including corrupt rows).
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DuplicateCode error.
    pub fn duplicate(code: impl Into<String>) -> Self {
        StoreError::DuplicateCode { code: code.into() }
    }

    /// True when this error is a unique-constraint conflict.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateCode { .. })
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → Inspect SQLSTATE (23505 = unique)
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
///
/// The unique-violation mapping here cannot know which coupon code
/// conflicted; `PgCouponStore::create` intercepts 23505 itself to attach
/// the code before this fallback runs.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                // PostgreSQL SQLSTATE codes:
                // 23505 = unique_violation
                if db_err.code().as_deref() == Some("23505") {
                    StoreError::DuplicateCode {
                        code: "unknown".to_string(),
                    }
                } else {
                    StoreError::QueryFailed(db_err.message().to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_carries_code() {
        let err = StoreError::duplicate("SAVE10");
        assert_eq!(err.to_string(), "Coupon code 'SAVE10' already exists");
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::PoolExhausted));
    }
}
