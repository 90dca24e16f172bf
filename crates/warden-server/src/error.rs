//! Error types for warden-server

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Result type alias for warden-server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from warden-core
    #[error("core error: {0}")]
    Core(#[from] warden_core::Error),

    /// Error from warden-session
    #[error("session error: {0}")]
    Session(#[from] warden_session::Error),

    /// Error from warden-acl
    #[error("ACL error: {0}")]
    Acl(#[from] warden_acl::Error),

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The email is already registered.
    #[error("email '{email}' is already registered")]
    EmailTaken {
        /// The conflicting email
        email: String,
    },

    /// Password hashing or verification failed.
    #[error("password hashing error: {message}")]
    PasswordHash {
        /// What the hasher reported
        message: String,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new password-hashing error.
    pub fn password_hash<S: Into<String>>(message: S) -> Self {
        Error::PasswordHash {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::EmailTaken { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        }
        let body = serde_json::json!({ "message": self.to_string() });
        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
