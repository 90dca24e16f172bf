//! The in-memory role/permission graph.
//!
//! The graph is a strict two-level structure: users acquire permissions
//! only transitively through roles (User → Roles → Permissions); roles
//! never reference roles, so cycles are impossible. Readers work
//! against an immutable snapshot for one authorization epoch;
//! replacement is a single atomic swap.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use warden_core::{Action, Identity, PermissionId, RoleId, UserId};

use crate::error::{Error, Result};

/// An authorization verdict. There is no third state: every
/// (identity, resource, action) triple yields exactly Allow or Deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request proceeds to its handler.
    Allow,
    /// The request is rejected before any handler runs.
    Deny,
}

impl Decision {
    /// Whether this verdict lets the request proceed.
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// A grant of an action on a resource pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    /// Unique id, referenced by roles.
    pub id: PermissionId,
    /// Pattern matched against the request resource; see
    /// [`pattern_matches`] for the policy.
    pub resource_pattern: String,
    /// The action this permission grants.
    pub action: Action,
}

/// A named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Unique id, referenced by bindings.
    pub id: RoleId,
    /// Human-readable name.
    pub name: String,
    /// The permissions this role grants.
    pub permissions: BTreeSet<PermissionId>,
}

/// Resource pattern matching. Deterministic and total:
///
/// - `"*"` matches every resource;
/// - a pattern ending in `"/*"` matches the prefix itself and anything
///   below it (`"/admin/*"` matches `/admin` and `/admin/settings`,
///   not `/administrator`);
/// - anything else matches by exact equality.
pub fn pattern_matches(pattern: &str, resource: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix("/*") {
        return resource == prefix
            || resource
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
    }
    pattern == resource
}

/// The immutable role/permission/binding set for one authorization
/// epoch.
///
/// Invariants, enforced at construction: every permission referenced by
/// a role exists; every role referenced by a binding exists; the public
/// role, when designated, exists.
#[derive(Debug, Default)]
pub struct AclSnapshot {
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    user_roles: HashMap<UserId, BTreeSet<RoleId>>,
    public_role: Option<RoleId>,
}

impl AclSnapshot {
    /// An empty snapshot: no roles, no bindings, no public role —
    /// every request is denied.
    pub fn empty() -> Self {
        AclSnapshot::default()
    }

    /// Builds a snapshot from its parts, validating referential
    /// integrity.
    pub fn from_parts(
        roles: HashMap<RoleId, Role>,
        permissions: HashMap<PermissionId, Permission>,
        user_roles: HashMap<UserId, BTreeSet<RoleId>>,
        public_role: Option<RoleId>,
    ) -> Result<Self> {
        for role in roles.values() {
            for permission_id in &role.permissions {
                if !permissions.contains_key(permission_id) {
                    return Err(Error::referential(
                        "permission",
                        permission_id.as_str(),
                        format!("role '{}'", role.id),
                    ));
                }
            }
        }
        for (user_id, bound) in &user_roles {
            for role_id in bound {
                if !roles.contains_key(role_id) {
                    return Err(Error::referential(
                        "role",
                        role_id.as_str(),
                        format!("user binding '{user_id}'"),
                    ));
                }
            }
        }
        if let Some(role_id) = &public_role {
            if !roles.contains_key(role_id) {
                return Err(Error::referential(
                    "role",
                    role_id.as_str(),
                    "the public role designation",
                ));
            }
        }
        Ok(AclSnapshot {
            roles,
            permissions,
            user_roles,
            public_role,
        })
    }

    /// Number of roles in this snapshot.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of permissions in this snapshot.
    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }

    /// Number of user→role bindings in this snapshot.
    pub fn binding_count(&self) -> usize {
        self.user_roles.values().map(BTreeSet::len).sum()
    }

    /// The roles currently bound to `user_id`.
    pub fn roles_for(&self, user_id: &UserId) -> BTreeSet<RoleId> {
        self.user_roles.get(user_id).cloned().unwrap_or_default()
    }

    /// Decides whether `identity` may perform `action` on `resource`.
    ///
    /// Every identity implicitly holds the designated public role;
    /// Anonymous holds nothing else. ALLOW iff at least one held role
    /// grants a matching permission.
    pub fn authorize(&self, identity: &Identity, resource: &str, action: Action) -> Decision {
        let held = identity.roles().chain(self.public_role.iter());
        for role_id in held {
            let Some(role) = self.roles.get(role_id) else {
                // A stale identity can hold a role the current epoch
                // no longer defines; it grants nothing.
                continue;
            };
            let granted = role
                .permissions
                .iter()
                .filter_map(|id| self.permissions.get(id))
                .any(|p| p.action == action && pattern_matches(&p.resource_pattern, resource));
            if granted {
                return Decision::Allow;
            }
        }
        Decision::Deny
    }
}

/// Shared handle over the current [`AclSnapshot`].
///
/// Many concurrent `authorize` calls read; at most one `replace`
/// writes. Readers clone the inner `Arc` and then work lock-free, so
/// an in-flight call completes against whichever snapshot was current
/// when it started — never a torn mix of old and new data.
#[derive(Debug)]
pub struct AclGraph {
    current: RwLock<Arc<AclSnapshot>>,
}

impl AclGraph {
    /// Creates a graph with an empty (deny-all) snapshot.
    pub fn new() -> Self {
        AclGraph {
            current: RwLock::new(Arc::new(AclSnapshot::empty())),
        }
    }

    /// Creates a graph seeded with `snapshot`.
    pub fn with_snapshot(snapshot: AclSnapshot) -> Self {
        AclGraph {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Callers holding the returned `Arc` keep
    /// reading the same epoch even across a concurrent `replace`.
    pub fn snapshot(&self) -> Arc<AclSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Atomically swaps in a new snapshot. In-flight readers finish on
    /// the epoch they started with.
    pub fn replace(&self, snapshot: AclSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        log::info!(
            "ACL graph replaced: {} roles, {} permissions, {} bindings",
            snapshot.role_count(),
            snapshot.permission_count(),
            snapshot.binding_count()
        );
        *current = snapshot;
    }

    /// Decides `action` on `resource` for `identity` against the
    /// current snapshot.
    pub fn authorize(&self, identity: &Identity, resource: &str, action: Action) -> Decision {
        self.snapshot().authorize(identity, resource, action)
    }

    /// The roles currently bound to `user_id`.
    pub fn roles_for(&self, user_id: &UserId) -> BTreeSet<RoleId> {
        self.snapshot().roles_for(user_id)
    }
}

impl Default for AclGraph {
    fn default() -> Self {
        Self::new()
    }
}
