//! Error types for warden-auth.

use thiserror::Error;

/// Result type alias for warden-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during identity resolution.
///
/// Note what is absent: a missing session, a logged-out session, and a
/// deleted user are not errors — they resolve to Anonymous. Only store
/// failures surface here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The session store failed to load, create, or save a record.
    #[error("session store failure: {0}")]
    Session(#[from] warden_session::Error),
}
