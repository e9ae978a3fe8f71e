//! Authentication error types.

use thiserror::Error;

/// Message fragment the auth service uses for unconfirmed sign-ins.
pub const EMAIL_NOT_CONFIRMED: &str = "Email not confirmed";

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The auth service rejected the request.
    ///
    /// Displays as the service's own message so it can be shown verbatim.
    #[error("{message}")]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Session not found
    #[error("Not logged in")]
    NotLoggedIn,

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Build a provider rejection.
    pub fn provider(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        AuthError::Provider {
            status,
            code,
            message: message.into(),
        }
    }

    /// Returns true if the sign-in was refused because the email address
    /// has not been confirmed yet.
    pub fn is_email_not_confirmed(&self) -> bool {
        match self {
            AuthError::Provider { code, message, .. } => {
                message.contains(EMAIL_NOT_CONFIRMED)
                    || code.as_deref() == Some("email_not_confirmed")
            }
            _ => false,
        }
    }

    /// Returns true if this error is transient and the operation can be retried.
    ///
    /// Transient errors include:
    /// - Connection failures and timeouts
    /// - 5xx responses from the auth service
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Provider { status, .. } => *status >= 500,
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            _ => false,
        }
    }
}

impl From<learnflow_config::CoreError> for AuthError {
    fn from(err: learnflow_config::CoreError) -> Self {
        match err {
            learnflow_config::CoreError::InvalidUrl(e) => AuthError::InvalidUrl(e),
            learnflow_config::CoreError::Io(e) => AuthError::Io(e),
            learnflow_config::CoreError::Json(e) => AuthError::Json(e),
            learnflow_config::CoreError::Config(msg) => AuthError::Config(msg),
            other => AuthError::Config(other.to_string()),
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
