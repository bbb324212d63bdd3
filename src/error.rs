//! # Error Handling
//!
//! This module provides the unified error type surfaced by every client and
//! repository operation. Database rejections are classified into stable,
//! recognizable kinds (unique violation, foreign-key violation, not-found)
//! where the driver gives us enough to go on; everything else stays a
//! generic database error. No operation retries or falls back silently.

use sea_orm::DbErr;
use thiserror::Error;

/// Unified error type for all store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("unique constraint violated{}", fmt_constraint(.constraint))]
    UniqueViolation { constraint: Option<String> },

    /// A foreign-key constraint rejected the write or delete
    #[error("foreign key constraint violated{}", fmt_constraint(.constraint))]
    ForeignKeyViolation { constraint: Option<String> },

    /// The requested row does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Caller-supplied arguments failed shape validation before any SQL ran
    #[error("validation failed: {0}")]
    Validation(String),

    /// The connection pool could not be established at startup
    #[error("failed to initialize store connection: {message}")]
    Initialization { message: String },

    /// An interactive transaction exceeded its deadline and was rolled back
    #[error("transaction timed out during {phase} after {elapsed_ms}ms")]
    TransactionTimeout { phase: TxPhase, elapsed_ms: u64 },

    /// The store rejected the operation for an unrecognized reason
    #[error("database error: {0}")]
    Database(#[source] DbErr),

    /// The query layer returned something malformed; not recoverable by retry
    #[error("internal error: {0}")]
    Internal(String),
}

/// Phase of a transaction in which a timeout fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    /// Waiting to acquire a connection and begin
    Acquire,
    /// Executing the caller's closure
    Execute,
}

impl std::fmt::Display for TxPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxPhase::Acquire => write!(f, "acquire"),
            TxPhase::Execute => write!(f, "execute"),
        }
    }
}

fn fmt_constraint(constraint: &Option<String>) -> String {
    match constraint {
        Some(name) => format!(" ({name})"),
        None => String::new(),
    }
}

impl StoreError {
    /// Stable error code for programmatic handling (SCREAMING_SNAKE_CASE)
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::UniqueViolation { .. } => "UNIQUE_VIOLATION",
            StoreError::ForeignKeyViolation { .. } => "FOREIGN_KEY_VIOLATION",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::Validation(_) => "VALIDATION_FAILED",
            StoreError::Initialization { .. } => "INITIALIZATION_FAILED",
            StoreError::TransactionTimeout { .. } => "TRANSACTION_TIMEOUT",
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the store rejected the call for a reason we can name
    /// (unique violation, FK violation, not-found)
    pub fn is_known_request_error(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. }
                | StoreError::ForeignKeyViolation { .. }
                | StoreError::NotFound(_)
        )
    }

    /// Classify a SeaORM error into a store error
    pub fn database_error(error: DbErr) -> Self {
        if let Some(constraint) = constraint_violation(&error, ViolationKind::Unique) {
            tracing::debug!(?error, "unique constraint violation detected");
            return StoreError::UniqueViolation { constraint };
        }

        if let Some(constraint) = constraint_violation(&error, ViolationKind::ForeignKey) {
            tracing::debug!(?error, "foreign key constraint violation detected");
            return StoreError::ForeignKeyViolation { constraint };
        }

        match error {
            DbErr::RecordNotFound(record) => StoreError::NotFound(record),
            other => StoreError::Database(other),
        }
    }

    /// Build a validation error
    pub fn validation_error<S: Into<String>>(message: S) -> Self {
        StoreError::Validation(message.into())
    }
}

impl From<DbErr> for StoreError {
    fn from(error: DbErr) -> Self {
        StoreError::database_error(error)
    }
}

enum ViolationKind {
    Unique,
    ForeignKey,
}

/// Returns Some(constraint-name) when `error` is a constraint violation of
/// the requested kind. Falls back to backend-specific error codes when the
/// driver does not classify the violation itself.
fn constraint_violation(error: &DbErr, kind: ViolationKind) -> Option<Option<String>> {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const PG_FOREIGN_KEY: &str = "23503";
    const MYSQL_DUPLICATE_CODES: &[&str] = &["1022", "1062", "1169", "1586"];
    const MYSQL_FK_CODES: &[&str] = &["1216", "1217", "1451", "1452"];
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];
    const SQLITE_FK_CODES: &[&str] = &["787", "1811"];

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return None,
    };

    let db_error = runtime_err.as_database_error()?;

    let matches_kind = match kind {
        ViolationKind::Unique => {
            db_error.is_unique_violation()
                || db_error.code().is_some_and(|code| {
                    code.as_ref() == PG_UNIQUE
                        || MYSQL_DUPLICATE_CODES.contains(&code.as_ref())
                        || SQLITE_DUPLICATE_CODES.contains(&code.as_ref())
                })
        }
        ViolationKind::ForeignKey => {
            db_error.is_foreign_key_violation()
                || db_error.code().is_some_and(|code| {
                    code.as_ref() == PG_FOREIGN_KEY
                        || MYSQL_FK_CODES.contains(&code.as_ref())
                        || SQLITE_FK_CODES.contains(&code.as_ref())
                })
        }
    };

    if !matches_kind {
        return None;
    }

    Some(db_error.constraint().map(|name| name.to_string()))
}
