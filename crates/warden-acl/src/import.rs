//! Bulk ACL import.
//!
//! Parses a JSON dataset describing roles, permissions, and bindings,
//! validates it, and atomically replaces the graph's contents. A failed
//! import never touches the active graph. Import fully replaces the
//! previous graph; it is never merged, so rerunning the same source is
//! idempotent.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use warden_core::{Action, PermissionId, RoleId, UserId};

use crate::error::{Error, Result};
use crate::graph::{AclGraph, AclSnapshot, Permission, Role};

/// The built-in example dataset, used when no file is configured.
const EXAMPLE_DATASET: &str = include_str!("../data/example_acl.json");

/// Where an import reads its dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// A JSON dataset file on disk.
    File(PathBuf),
    /// The built-in example dataset shipped with the crate.
    BuiltinExample,
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::File(path) => write!(f, "{}", path.display()),
            ImportSource::BuiltinExample => write!(f, "built-in example dataset"),
        }
    }
}

/// What a successful import applied to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Description of the dataset source.
    pub source: String,
    /// Number of roles applied.
    pub roles: usize,
    /// Number of permissions applied.
    pub permissions: usize,
    /// Number of role→permission grants applied.
    pub role_grants: usize,
    /// Number of user→role bindings applied.
    pub user_bindings: usize,
}

// Dataset wire format. Unknown fields are ignored (serde default);
// missing required fields fail the parse.

#[derive(Debug, Deserialize)]
struct RoleEntry {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionEntry {
    id: String,
    resource_pattern: String,
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RolePermissionEntry {
    role_id: String,
    permission_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRoleEntry {
    user_id: String,
    role_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Dataset {
    roles: Vec<RoleEntry>,
    permissions: Vec<PermissionEntry>,
    role_permissions: Vec<RolePermissionEntry>,
    user_roles: Vec<UserRoleEntry>,
}

/// One-shot bulk importer over a shared [`AclGraph`].
///
/// Runs at startup (or not at all); it never runs concurrently with
/// itself.
pub struct Importer {
    graph: Arc<AclGraph>,
    public_role: Option<RoleId>,
}

impl Importer {
    /// Creates an importer that replaces `graph` on success.
    pub fn new(graph: Arc<AclGraph>) -> Self {
        Importer {
            graph,
            public_role: None,
        }
    }

    /// Designates the role whose grants apply to every identity,
    /// anonymous included. The dataset must define it.
    pub fn with_public_role(mut self, role: RoleId) -> Self {
        self.public_role = Some(role);
        self
    }

    /// Parses and validates `source`, then atomically replaces the
    /// graph's contents.
    ///
    /// On any failure the active graph is left untouched and the
    /// process keeps serving on its last-known-good contents.
    pub fn import_from(&self, source: ImportSource) -> Result<ImportReport> {
        let text = match &source {
            ImportSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| Error::Io {
                    path: path.clone(),
                    source: e,
                })?
            }
            ImportSource::BuiltinExample => EXAMPLE_DATASET.to_string(),
        };
        let dataset: Dataset = serde_json::from_str(&text)?;
        let (snapshot, report) = self.build_snapshot(&source, dataset)?;
        self.graph.replace(snapshot);
        log::info!(
            "ACL import applied from {}: {} roles, {} permissions, {} grants, {} bindings",
            report.source,
            report.roles,
            report.permissions,
            report.role_grants,
            report.user_bindings
        );
        Ok(report)
    }

    fn build_snapshot(
        &self,
        source: &ImportSource,
        dataset: Dataset,
    ) -> Result<(AclSnapshot, ImportReport)> {
        let mut permissions: HashMap<PermissionId, Permission> = HashMap::new();
        for entry in dataset.permissions {
            let id = PermissionId::new(entry.id);
            permissions.insert(
                id.clone(),
                Permission {
                    id,
                    resource_pattern: entry.resource_pattern,
                    action: entry.action,
                },
            );
        }

        let mut roles: HashMap<RoleId, Role> = HashMap::new();
        for entry in dataset.roles {
            let id = RoleId::new(entry.id);
            roles.insert(
                id.clone(),
                Role {
                    id,
                    name: entry.name,
                    permissions: BTreeSet::new(),
                },
            );
        }

        let mut role_grants = 0usize;
        for (index, entry) in dataset.role_permissions.into_iter().enumerate() {
            let referenced_by = format!("rolePermissions[{index}]");
            let permission_id = PermissionId::new(entry.permission_id);
            if !permissions.contains_key(&permission_id) {
                return Err(Error::referential(
                    "permission",
                    permission_id.as_str(),
                    referenced_by,
                ));
            }
            let Some(role) = roles.get_mut(&RoleId::new(entry.role_id.clone())) else {
                return Err(Error::referential("role", entry.role_id, referenced_by));
            };
            if role.permissions.insert(permission_id) {
                role_grants += 1;
            }
        }

        let mut user_roles: HashMap<UserId, BTreeSet<RoleId>> = HashMap::new();
        let mut user_bindings = 0usize;
        for (index, entry) in dataset.user_roles.into_iter().enumerate() {
            let role_id = RoleId::new(entry.role_id);
            if !roles.contains_key(&role_id) {
                return Err(Error::referential(
                    "role",
                    role_id.as_str(),
                    format!("userRoles[{index}]"),
                ));
            }
            if user_roles
                .entry(UserId::new(entry.user_id))
                .or_default()
                .insert(role_id)
            {
                user_bindings += 1;
            }
        }

        let report = ImportReport {
            source: source.to_string(),
            roles: roles.len(),
            permissions: permissions.len(),
            role_grants,
            user_bindings,
        };
        let snapshot =
            AclSnapshot::from_parts(roles, permissions, user_roles, self.public_role.clone())?;
        Ok((snapshot, report))
    }
}
