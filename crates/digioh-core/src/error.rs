//! Errors returned by the auth provider and the table API.
//!
//! Both are recoverable: callers turn them into a [`Notice`](crate::Notice)
//! and carry on rendering.

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// E-mail/password pair rejected.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Sign-up for an e-mail that already has an account.
    #[error("User already registered: {0}")]
    AccountExists(String),

    /// The access token is expired or was revoked.
    #[error("Session expired or invalid")]
    SessionExpired,

    /// Transport failure talking to the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// Any other provider-side rejection.
    #[error("{message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Provider message, already scrubbed of secrets.
        message: String,
    },
}

impl AuthError {
    /// Whether the error means the presented session is no longer usable.
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Profile or content fetch errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the table API.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response message.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}
