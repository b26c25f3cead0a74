//! Conversions from external infrastructure errors into domain errors.

use launder_domain::LaunderError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LaunderError);

impl From<InfraError> for LaunderError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LaunderError> for InfraError {
    fn from(value: LaunderError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLaunderError {
    fn into_launder(self) -> LaunderError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LaunderError */
/* -------------------------------------------------------------------------- */

impl IntoLaunderError for SqlError {
    fn into_launder(self) -> LaunderError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        LaunderError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        LaunderError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        LaunderError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        LaunderError::Database("foreign key constraint violation".into())
                    }
                    (ErrorCode::NotADatabase, _) => {
                        LaunderError::Database("file is not a database".into())
                    }
                    _ => LaunderError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LaunderError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LaunderError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                LaunderError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => LaunderError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidParameterName(parameter_name) => {
                LaunderError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => LaunderError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => LaunderError::Database("invalid SQL query".into()),
            other => LaunderError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_launder())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LaunderError */
/* -------------------------------------------------------------------------- */

impl IntoLaunderError for r2d2::Error {
    fn into_launder(self) -> LaunderError {
        LaunderError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_launder())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → LaunderError */
/* -------------------------------------------------------------------------- */

impl IntoLaunderError for JoinError {
    fn into_launder(self) -> LaunderError {
        if self.is_cancelled() {
            LaunderError::Internal("blocking task cancelled".into())
        } else {
            LaunderError::Internal(format!("blocking task panicked: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_launder())
    }
}

/// Map a failed `spawn_blocking` join into the domain error.
pub fn map_join_error(err: JoinError) -> LaunderError {
    InfraError::from(err).into()
}
