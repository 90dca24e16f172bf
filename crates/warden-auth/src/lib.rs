//! Access-control enforcement for Gatewarden.
//!
//! Provides:
//! - [`IdentityResolver`] — session-to-identity resolution with
//!   fail-closed degradation to Anonymous
//! - [`AccessLayer`] / [`AccessService`] — Tower middleware that
//!   resolves identity and authorizes every inbound request before any
//!   route handler executes
//! - [`AccessConfig`] — configuration for the middleware
//! - Request-extension helpers for downstream handlers

mod context;
mod error;
mod middleware;
mod resolver;

pub use context::{identity_from_parts, session_from_parts};
pub use error::{Error, Result};
pub use middleware::{AccessLayer, AccessService};
pub use resolver::{IdentityResolver, ResolvedRequest};

/// Configuration for the access middleware.
#[derive(Clone, Debug)]
pub struct AccessConfig {
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            cookie_name: "warden_session".to_string(),
        }
    }
}
