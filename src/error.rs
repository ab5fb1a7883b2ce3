/// Unified error types for the ChezFlora admin client
use thiserror::Error;

/// Main error type for remote calls, sessions and configuration
#[derive(Error, Debug)]
pub enum AdminError {
    /// The backend answered with a failure
    #[error("Remote call failed: {0}")]
    Remote(String),

    /// Transport errors (connection refused, timeout, bad TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication errors (no session, expired token, wrong password)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Validation errors (closed-set values, malformed drafts)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// The owning view went away before the call settled
    #[error("Operation cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdminError {
    /// Text shown to the user after the failed action's label
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Remote(message)
            | AdminError::Authentication(message)
            | AdminError::Validation(message)
            | AdminError::NotFound(message) => message.clone(),
            AdminError::Http(e) if e.is_timeout() => "le serveur ne répond pas".to_string(),
            AdminError::Http(_) => "serveur injoignable".to_string(),
            AdminError::Cancelled => "opération annulée".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AdminError::Validation(errors.to_string())
    }
}

/// Backend error body, e.g. `{"message": "Email already used"}`
#[derive(Debug, serde::Deserialize)]
pub struct RemoteErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl RemoteErrorBody {
    /// Pick the most descriptive text the backend sent
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

/// Result type alias for admin operations
pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_body_prefers_message() {
        let body: RemoteErrorBody =
            serde_json::from_str(r#"{"message":"Email déjà utilisé","error":"Conflict"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Email déjà utilisé"));

        let body: RemoteErrorBody = serde_json::from_str(r#"{"error":"Forbidden"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Forbidden"));

        let body: RemoteErrorBody = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn test_error_display() {
        let err = AdminError::Remote("boom".to_string());
        assert_eq!(err.to_string(), "Remote call failed: boom");
        assert_eq!(AdminError::Cancelled.to_string(), "Operation cancelled");
    }
}
