use thiserror::Error;
use tokio::time::error::Elapsed;

/// Storage failures, reduced to the kinds callers act on.
///
/// The carried strings are for server-side logs only.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("deadline exceeded")]
    Timeout,

    #[error("unknown storage error: {0}")]
    Unknown(String),
}

impl AdapterError {
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::ConnectionFailure(_) => "connection_failure",
            AdapterError::ConstraintViolation(_) => "constraint_violation",
            AdapterError::Timeout => "timeout",
            AdapterError::Unknown(_) => "unknown",
        }
    }
}

impl From<Elapsed> for AdapterError {
    fn from(_: Elapsed) -> Self {
        AdapterError::Timeout
    }
}

impl From<sqlx::Error> for AdapterError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // SQLSTATE class 23: integrity constraint violation
            sqlx::Error::Database(db_err)
                if db_err.code().is_some_and(|code| code.starts_with("23")) =>
            {
                AdapterError::ConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AdapterError::ConnectionFailure(err.to_string()),
            _ => AdapterError::Unknown(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_connection_errors_map_to_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            AdapterError::from(sqlx::Error::Io(io)),
            AdapterError::ConnectionFailure(_)
        ));
        assert!(matches!(
            AdapterError::from(sqlx::Error::PoolClosed),
            AdapterError::ConnectionFailure(_)
        ));
        assert!(matches!(
            AdapterError::from(sqlx::Error::PoolTimedOut),
            AdapterError::ConnectionFailure(_)
        ));
    }

    /// Postgres-style error carrying only a SQLSTATE code.
    #[derive(Debug)]
    struct SqlStateError {
        code: &'static str,
    }

    impl std::fmt::Display for SqlStateError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "sqlstate {}", self.code)
        }
    }

    impl std::error::Error for SqlStateError {}

    impl sqlx::error::DatabaseError for SqlStateError {
        fn message(&self) -> &str {
            "statement failed"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(std::borrow::Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.code {
                "23505" => sqlx::error::ErrorKind::UniqueViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn database_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(SqlStateError { code }))
    }

    #[test]
    fn test_integrity_violations_map_to_constraint_violation() {
        // unique_violation, check_violation
        for code in ["23505", "23514"] {
            let err = AdapterError::from(database_error(code));
            assert!(
                matches!(err, AdapterError::ConstraintViolation(_)),
                "code {code} mapped to {err:?}"
            );
        }
    }

    #[test]
    fn test_other_sqlstate_maps_to_unknown() {
        // undefined_table
        let err = AdapterError::from(database_error("42P01"));
        assert!(matches!(err, AdapterError::Unknown(_)));
    }

    #[test]
    fn test_other_errors_map_to_unknown() {
        let err = AdapterError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AdapterError::Unknown(_)));
        assert_eq!(err.kind(), "unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_maps_to_timeout() {
        let elapsed = tokio::time::timeout(
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_secs(1)),
        )
        .await
        .unwrap_err();

        assert!(matches!(AdapterError::from(elapsed), AdapterError::Timeout));
    }
}
