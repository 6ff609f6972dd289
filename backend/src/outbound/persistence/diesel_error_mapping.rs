//! Shared Diesel error mapping for the catalog repositories.
//!
//! Every repository port error has `Connection` and `Query` variants; these
//! helpers pick between them so each adapter only supplies constructors and
//! handles its own special cases (unique violations, revision checks) first.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel failures into query or connection constructors.
pub(crate) fn map_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Convert a stored revision, rejecting values the schema forbids.
pub(crate) fn revision_from_db<E>(revision: i32, query: impl FnOnce(String) -> E) -> Result<u32, E> {
    u32::try_from(revision)
        .ok()
        .filter(|rev| *rev >= 1)
        .ok_or_else(|| query(format!("invalid stored revision {revision}")))
}

/// Convert a domain revision for storage.
pub(crate) fn revision_to_db<E>(revision: u32, query: impl FnOnce(String) -> E) -> Result<i32, E> {
    i32::try_from(revision).map_err(|_| query(format!("revision {revision} out of range")))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::FavoritePersistenceError;

    fn map(error: DieselError) -> FavoritePersistenceError {
        map_diesel_error(
            error,
            FavoritePersistenceError::query,
            FavoritePersistenceError::connection,
        )
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err = map_pool_error(
            PoolError::checkout("timed out"),
            FavoritePersistenceError::connection,
        );
        assert_eq!(err, FavoritePersistenceError::connection("timed out"));
    }

    #[rstest]
    fn closed_connection_is_a_connection_error() {
        let err = map(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("closed".to_owned()),
        ));
        assert!(matches!(err, FavoritePersistenceError::Connection { .. }));
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        let err = map(DieselError::NotFound);
        assert!(err.to_string().contains("record not found"));
    }

    #[rstest]
    fn unique_violations_are_detected() {
        let err = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&DieselError::NotFound));
    }

    #[rstest]
    #[case(0, false)]
    #[case(-3, false)]
    #[case(4, true)]
    fn stored_revisions_must_be_positive(#[case] stored: i32, #[case] ok: bool) {
        let result = revision_from_db(stored, FavoritePersistenceError::query);
        assert_eq!(result.is_ok(), ok);
    }
}
