//! Conversions from external infrastructure errors into domain errors.

use taper_domain::TaperError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TaperError);

impl From<InfraError> for TaperError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TaperError> for InfraError {
    fn from(value: TaperError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error -> TaperError */
/* -------------------------------------------------------------------------- */

impl From<rusqlite::Error> for InfraError {
    fn from(value: rusqlite::Error) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let mapped = match value {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    // Busy/locked databases are the retryable class: the
                    // writer holding the lock will release it.
                    ErrorCode::DatabaseBusy => {
                        TaperError::TransientStorage("database is busy".into())
                    }
                    ErrorCode::DatabaseLocked => {
                        TaperError::TransientStorage("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        TaperError::Database(format!("constraint violation: {message}"))
                    }
                    _ => TaperError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => TaperError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                TaperError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TaperError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => TaperError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidQuery => TaperError::Database("invalid SQL query".into()),
            other => TaperError::Database(other.to_string()),
        };

        InfraError(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error -> TaperError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        // Pool exhaustion and checkout timeouts resolve themselves once
        // in-flight work completes, so they join the retryable class.
        InfraError(TaperError::TransientStorage(format!("connection pool error: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: rusqlite::ffi::ErrorCode) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error { code, extended_code: 0 },
            Some("test".into()),
        )
    }

    #[test]
    fn busy_and_locked_map_to_transient_storage() {
        for code in
            [rusqlite::ffi::ErrorCode::DatabaseBusy, rusqlite::ffi::ErrorCode::DatabaseLocked]
        {
            let err: TaperError = InfraError::from(sqlite_failure(code)).into();
            assert!(err.is_transient(), "{code:?} should be transient");
        }
    }

    #[test]
    fn constraint_violation_is_not_retryable() {
        let err: TaperError =
            InfraError::from(sqlite_failure(rusqlite::ffi::ErrorCode::ConstraintViolation)).into();
        assert!(matches!(err, TaperError::Database(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: TaperError = InfraError::from(rusqlite::Error::QueryReturnedNoRows).into();
        assert!(matches!(err, TaperError::NotFound(_)));
    }
}
