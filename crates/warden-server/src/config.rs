//! Server configuration.
//!
//! Loaded from a TOML file given on the command line; every field has
//! a default so an empty file (or no file at all) yields a runnable
//! demo configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Controls the startup-time ACL import.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AclImportConfig {
    /// Path of the JSON dataset. Empty means the built-in example
    /// dataset is used if the import runs.
    #[serde(default)]
    pub file: String,

    /// Whether to run the import at startup, replacing the active
    /// graph. When false the process serves whatever graph it already
    /// has.
    #[serde(default)]
    pub run: bool,
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Role whose grants apply to every identity, anonymous included.
    #[serde(default = "default_public_role")]
    pub public_role: String,

    /// Startup ACL import behavior.
    #[serde(default)]
    pub acl_import: AclImportConfig,
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_cookie_name() -> String {
    "warden_session".to_string()
}

fn default_public_role() -> String {
    "public".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: default_listen(),
            cookie_name: default_cookie_name(),
            public_role: default_public_role(),
            acl_import: AclImportConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))
    }
}
