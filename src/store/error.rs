use std::fmt;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Error types for store operations
#[derive(Debug)]
pub enum Error {
    /// Validation error - invalid input data
    ValidationError(String),

    /// Connection error - database unreachable or authentication failure
    ConnectionError(String),

    /// Not found error - row doesn't exist or isn't owned by the caller
    NotFoundError(String),

    /// Duplicate error - a unique constraint rejected the write
    DuplicateError(String),

    /// Database error - SQL errors, constraint violations
    DatabaseError(String),

    /// Pool error - connection pool issues
    PoolError(String),

    /// Transaction error - transaction-specific errors
    TransactionError(String),
}

impl Error {
    /// True when the error was raised because the database could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::ConnectionError(_) | Error::PoolError(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Error::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Error::DuplicateError(msg) => write!(f, "Duplicate: {}", msg),
            Error::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            Error::PoolError(msg) => write!(f, "Pool error: {}", msg),
            Error::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Convert tokio-postgres errors to store errors
impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            let message = db_error.message();

            if db_error.code().code() == UNIQUE_VIOLATION {
                let constraint = db_error.constraint().unwrap_or("unknown constraint");
                return Error::DuplicateError(format!("{} ({})", message, constraint));
            }

            return Error::DatabaseError(format!("{}: {}", db_error.code().code(), message));
        }

        if err.is_closed() {
            return Error::ConnectionError(err.to_string());
        }

        Error::DatabaseError(format!("{:?}", err))
    }
}

/// Convert deadpool errors to store errors
impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Backend(e) => Error::ConnectionError(e.to_string()),
            other => Error::PoolError(other.to_string()),
        }
    }
}

/// Convert deadpool build errors to store errors
impl From<deadpool_postgres::BuildError> for Error {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        Error::ConnectionError(err.to_string())
    }
}

/// Convert UUID parse errors to store errors
impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::ValidationError(format!("Invalid UUID: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::NotFoundError("conversation".to_string()).to_string(),
            "Not found: conversation"
        );
        assert!(Error::DuplicateError("users_email_key".to_string())
            .to_string()
            .starts_with("Duplicate"));
    }

    #[test]
    fn test_is_unavailable() {
        assert!(Error::ConnectionError("refused".to_string()).is_unavailable());
        assert!(Error::PoolError("timeout".to_string()).is_unavailable());
        assert!(!Error::DatabaseError("syntax".to_string()).is_unavailable());
    }

    #[test]
    fn test_from_uuid_error() {
        let err: Error = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert!(matches!(err, Error::ValidationError(_)));
    }
}
