// Errors surfaced by the analyzer API seam
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("No authentication token found. Please log in again.")]
    MissingToken,

    /// No response reached us.
    #[error("No response from server. Please check your connection.")]
    Transport(String),

    #[error("Server error: {status} - {}", message.as_deref().unwrap_or("Unknown error"))]
    Server { status: u16, message: Option<String> },

    #[error("Failed to decode server response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Server { status: 403, .. })
    }

    /// The `error` field of a server error payload, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ApiError::Server {
            status: 500,
            message: Some("database unavailable".to_string()),
        };
        assert_eq!(err.to_string(), "Server error: 500 - database unavailable");

        let err = ApiError::Server {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "Server error: 502 - Unknown error");
        assert_eq!(
            ApiError::Transport("connection refused".to_string()).to_string(),
            "No response from server. Please check your connection."
        );
    }

    #[test]
    fn test_forbidden_classification() {
        assert!(ApiError::Server {
            status: 403,
            message: None
        }
        .is_forbidden());
        assert!(!ApiError::Server {
            status: 401,
            message: None
        }
        .is_forbidden());
        assert!(!ApiError::MissingToken.is_forbidden());
    }
}
