use rusqlite::ErrorCode;
use rust_decimal::Decimal;

/// Broad classification callers can branch on without matching driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Constraint,
    Connectivity,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),
    #[error("Failed to obtain database connection: {0}")]
    Connectivity(#[from] r2d2::Error),
    #[error("Query failed: {0}")]
    Query(#[source] rusqlite::Error),
    #[error("Amount {0} cannot be stored")]
    Amount(Decimal),
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Constraint(_) => ErrorKind::Constraint,
            DbError::Connectivity(_) => ErrorKind::Connectivity,
            DbError::Query(_) | DbError::Amount(_) => ErrorKind::Other,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(error: rusqlite::Error) -> Self {
        match error.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => DbError::Constraint(error),
            _ => DbError::Query(error),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
