//! # warden-acl
//!
//! Access control for Gatewarden:
//! - Role and permission entities with resource-pattern bindings
//! - ALLOW/DENY verdicts per (identity, resource, action)
//! - Atomic graph replacement with snapshot semantics for readers
//! - Bulk import from a JSON dataset or the built-in example dataset

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod graph;
pub mod import;

pub use error::{Error, Result};
pub use graph::{AclGraph, AclSnapshot, Decision, Permission, Role};
pub use import::{ImportReport, ImportSource, Importer};
