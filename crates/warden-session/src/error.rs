//! Error types for warden-session

use thiserror::Error;

/// Result type alias for warden-session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-session
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The token is absent from the store, expired, or malformed.
    ///
    /// Recoverable by design: the resolver answers Anonymous and
    /// creates a fresh session.
    #[error("session not found")]
    NotFound,

    /// The platform could not produce random bytes for a new token.
    #[error("session token generation failed: {message}")]
    Token {
        /// What the random source reported
        message: String,
    },

    /// The backing store failed to persist or read a record.
    #[error("session storage error: {message}")]
    Storage {
        /// What the backend reported
        message: String,
    },
}

impl Error {
    /// Creates a new token-generation error.
    pub fn token<S: Into<String>>(message: S) -> Self {
        Error::Token {
            message: message.into(),
        }
    }

    /// Creates a new storage error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Whether this error means the session simply does not exist.
    ///
    /// The resolver branches on this: a missing session degrades to
    /// Anonymous, any other error propagates.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}
