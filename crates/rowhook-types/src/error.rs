use thiserror::Error;

/// Failures reported by the table service API boundary.
///
/// Status codes are classified once, where the response is received; callers
/// match on variants rather than inspecting codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("authentication rejected by the table service")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Errors from the durable trigger state store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The database could not be reached (pool closed or timed out, I/O failure).
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from subscription lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The trigger is misconfigured; fixing it needs operator action.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The service accepted the create call but did not report an active
    /// webhook with an id.
    #[error("webhook creation response did not contain the expected data: {body}")]
    UnexpectedResponse { body: String },

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_lifecycle_error_wraps_api_error_transparently() {
        let err = LifecycleError::from(ApiError::Transport("connection reset".to_string()));
        assert_eq!(err.to_string(), "transport error: connection reset");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");

        let err = RepositoryError::Connection("pool timed out".to_string());
        assert_eq!(err.to_string(), "database connection error: pool timed out");
    }
}
