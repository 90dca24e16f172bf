//! Warden Core — shared types for the Gatewarden access-control engine.
//!
//! This crate provides the foundational types used across all warden crates.
//! It has no internal warden dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`ids`]: Identifier newtypes for users, roles, and permissions
//! - [`identity`]: The resolved authentication state of a request
//! - [`user`]: User records and the user directory seam

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod identity;
pub mod ids;
pub mod user;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use identity::{Action, Identity};
pub use ids::{PermissionId, RoleId, UserId};
pub use user::{User, UserDirectory};
