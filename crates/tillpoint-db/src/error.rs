//! # Database Error Types
//!
//! Error types for database operations and the sale engine.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleError ◄── CoreError (validation, stock, not found, state)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller matches on SaleError::code()                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use tillpoint_core::{CoreError, ErrorCode, ValidationErrors};

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - Non-positive price on a product
    /// - Stock driven below zero (should be impossible through the ledger)
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Line item referencing a non-existent product or sale
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Pool already closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// Includes `database is locked` once the busy timeout expires.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Unit of work could not begin, commit or roll back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "CHECK constraint failed: <expr>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("CHECK constraint failed") {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Sale Error
// =============================================================================

/// Error returned by the sale processor.
///
/// Exactly one of: a business outcome the caller can act on, or an
/// infrastructure failure after which the store is unchanged.
#[derive(Debug, Error)]
pub enum SaleError {
    /// Validation, stock, not-found or state error.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The store failed; the unit of work was rolled back.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl SaleError {
    /// Machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SaleError::Rejected(err) => err.code(),
            SaleError::Store(_) => ErrorCode::DatabaseError,
        }
    }

    /// Infrastructure failures had no effect and may be retried as-is.
    /// Business rejections will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SaleError::Store(_))
    }

    /// The domain error, if this is a business rejection.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            SaleError::Rejected(err) => Some(err),
            SaleError::Store(_) => None,
        }
    }
}

impl From<ValidationErrors> for SaleError {
    fn from(err: ValidationErrors) -> Self {
        SaleError::Rejected(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for SaleError {
    fn from(err: sqlx::Error) -> Self {
        SaleError::Store(DbError::from(err))
    }
}

/// Result type for sale processor operations.
pub type SaleResult<T> = Result<T, SaleError>;

// =============================================================================
// Unit Tests
// =============================================================================
