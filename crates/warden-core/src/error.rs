//! Error types for warden-core

use thiserror::Error;

/// Result type alias for warden-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A user directory backend failed to answer a lookup.
    ///
    /// Callers on the authentication path must treat this as an absent
    /// user (fail closed), never as a fault to propagate to the client.
    #[error("user directory error: {message}")]
    Directory {
        /// What the backend reported
        message: String,
    },
}

impl Error {
    /// Creates a new directory error with a message.
    pub fn directory<S: Into<String>>(message: S) -> Self {
        Error::Directory {
            message: message.into(),
        }
    }
}
