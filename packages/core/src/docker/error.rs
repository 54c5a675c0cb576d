//! Docker-specific error types

use thiserror::Error;

/// Errors raised while talking to the Docker daemon
#[derive(Debug, Error)]
pub enum DockerError {
    /// The daemon could not be reached
    #[error("Docker connection failed: {0}")]
    Connection(String),

    /// The daemon socket exists but nothing answers
    #[error("Docker daemon is not running")]
    NotRunning,

    /// The current user may not open the daemon socket
    #[error("Permission denied accessing the Docker socket")]
    PermissionDenied,

    /// No daemon socket at the expected location
    #[error("Docker socket not found")]
    SocketNotFound,

    /// A container operation was rejected by the daemon
    #[error("{0}")]
    Container(String),

    /// An image lookup failed
    #[error("Image operation failed: {0}")]
    Image(String),

    /// An image pull failed
    #[error("Image pull failed: {0}")]
    Pull(String),

    /// The request to the daemon timed out before it answered
    #[error("Docker request timed out: {0}")]
    Timeout(String),
}

impl From<bollard::errors::Error> for DockerError {
    fn from(err: bollard::errors::Error) -> Self {
        if matches!(err, bollard::errors::Error::RequestTimeoutError) {
            return DockerError::Timeout(err.to_string());
        }

        let msg = err.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("permission denied") {
            DockerError::PermissionDenied
        } else if lower.contains("no such file or directory") || lower.contains("socket not found")
        {
            DockerError::SocketNotFound
        } else if lower.contains("connection refused") {
            DockerError::NotRunning
        } else {
            DockerError::Connection(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_maps_to_timeout() {
        let err = DockerError::from(bollard::errors::Error::RequestTimeoutError);
        assert!(matches!(err, DockerError::Timeout(_)));
    }

    #[test]
    fn server_error_maps_to_connection() {
        let err = DockerError::from(bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "boom".to_string(),
        });
        match err {
            DockerError::Connection(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn container_error_displays_engine_text_verbatim() {
        let err = DockerError::Container("Failed to create container: no space".to_string());
        assert_eq!(err.to_string(), "Failed to create container: no space");
    }
}
