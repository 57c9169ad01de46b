//! Shared classification of pool and Diesel failures.
//!
//! Repositories turn a [`DieselFailure`] into their own port error, which
//! keeps unique-violation handling in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse category of a persistence failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The database could not be reached or dropped the connection.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Any other query failure. The message is safe to log, not to show.
    Query(String),
}

impl DieselFailure {
    /// True for a unique violation on `constraint`.
    pub(crate) fn violates(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: Some(name) } if name == constraint)
    }
}

/// Classify a pool checkout or build failure.
pub(crate) fn classify_pool_error(error: PoolError) -> DieselFailure {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    DieselFailure::Connection(message)
}

/// Classify a Diesel query failure.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection closed".to_owned())
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("query builder error".to_owned()),
        DieselError::DeserializationError(err) => {
            DieselFailure::Query(format!("row decode failed: {err}"))
        }
        _ => DieselFailure::Query("database error".to_owned()),
    }
}
