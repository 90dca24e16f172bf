//! Request-extension helpers for downstream handlers.
//!
//! The access middleware stores the resolved [`Identity`] and the
//! current [`Session`] in request extensions; handlers read them from
//! there and write session changes back through the store, never
//! keeping private copies.

use warden_core::Identity;
use warden_session::Session;

/// Extracts the resolved `Identity` from HTTP request `Parts`, if the
/// access middleware ran.
pub fn identity_from_parts(parts: &http::request::Parts) -> Option<&Identity> {
    parts.extensions.get::<Identity>()
}

/// Extracts the request's `Session` from HTTP request `Parts`, if the
/// access middleware ran.
pub fn session_from_parts(parts: &http::request::Parts) -> Option<&Session> {
    parts.extensions.get::<Session>()
}
