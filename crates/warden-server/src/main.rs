//! Gatewarden server
//!
//! Session-authenticated, ACL-gated demo HTTP application.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use warden_acl::ImportSource;
use warden_auth::AccessConfig;
use warden_core::RoleId;
use warden_server::{router, AppState, ServerConfig};

/// Gatewarden server - session auth and access control
#[derive(Parser, Debug)]
#[command(name = "warden-server")]
#[command(about = "Gatewarden session-auth and ACL demo server", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Run the ACL import at startup, replacing the active graph from
    /// the configured dataset (or the built-in example dataset)
    #[arg(long)]
    import_acl_from_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    let state = AppState::new();
    if config.acl_import.run || args.import_acl_from_json {
        let source = if config.acl_import.file.is_empty() {
            log::warn!("no ACL dataset file configured, importing the built-in example dataset");
            ImportSource::BuiltinExample
        } else {
            ImportSource::File(PathBuf::from(&config.acl_import.file))
        };
        let importer = state.importer(RoleId::new(config.public_role.clone()));
        match importer.import_from(source) {
            Ok(report) => log::info!(
                "ACL import complete from {}: {} roles, {} permissions, {} bindings",
                report.source,
                report.roles,
                report.permissions,
                report.user_bindings
            ),
            // Keep serving on the last-known-good graph.
            Err(err) => log::error!("ACL import failed, active graph unchanged: {err}"),
        }
    }

    let access = AccessConfig {
        cookie_name: config.cookie_name.clone(),
    };
    let app = router(state, access);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    log::info!("listening on {}", config.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
