//! # warden-server
//!
//! The Gatewarden demo HTTP application:
//! - User registration and credential verification
//! - Login/logout over server-side sessions
//! - Every route gated by the access middleware before it runs
//! - Startup-time ACL import from a file or the built-in dataset

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod directory;
pub mod error;
pub mod routes;

pub use config::{AclImportConfig, ServerConfig};
pub use directory::MemoryUserDirectory;
pub use error::{Error, Result};
pub use routes::{router, AppState};
