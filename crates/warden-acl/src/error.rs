//! Error types for warden-acl

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for warden-acl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-acl
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The dataset file could not be read.
    #[error("failed to read ACL dataset {}: {source}", path.display())]
    Io {
        /// Path of the dataset that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not valid JSON or does not match the schema.
    #[error("ACL dataset parse failure: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset references an entity it never defines.
    ///
    /// A failed import leaves the active graph untouched; the process
    /// keeps serving on its last-known-good graph.
    #[error("ACL referential failure: {entity} '{id}' referenced by {referenced_by} is not defined")]
    Referential {
        /// Kind of the missing entity ("role" or "permission")
        entity: &'static str,
        /// Id of the missing entity
        id: String,
        /// Which dataset entry made the dangling reference
        referenced_by: String,
    },
}

impl Error {
    /// Creates a new referential failure.
    pub fn referential<I, R>(entity: &'static str, id: I, referenced_by: R) -> Self
    where
        I: Into<String>,
        R: Into<String>,
    {
        Error::Referential {
            entity,
            id: id.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Whether this is a referential-integrity failure (as opposed to a
    /// parse or I/O failure).
    pub fn is_referential(&self) -> bool {
        matches!(self, Error::Referential { .. })
    }
}
