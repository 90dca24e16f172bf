//! User records and the user directory seam.

use crate::error::Result;
use crate::ids::UserId;

/// A user known to the directory.
///
/// `password_hash` is a PHC-format string and never leaves the server
/// boundary; response shaping masks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier, also the key for ACL bindings.
    pub id: UserId,
    /// Login email, unique within a directory.
    pub email: String,
    /// Display name.
    pub name: String,
    /// PHC-format password hash.
    pub password_hash: String,
}

/// The external user directory the identity resolver consults.
///
/// Implementations are injected as shared handles; the engine never
/// reaches for ambient global state. Lookup is expected to complete or
/// fail within a bounded time — a directory that cannot answer returns
/// an error, and the resolver treats that as an absent user.
pub trait UserDirectory: Send + Sync {
    /// Looks up a user by id. `Ok(None)` means the user does not exist
    /// (for example a deleted account with a surviving session).
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;
}
