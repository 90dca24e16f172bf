//! The resolved authentication state of a request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::{RoleId, UserId};

/// The identity attached to a request after session resolution.
///
/// Either the request carries a logged-in session that resolved to a
/// live user, or it is anonymous. There is no third state: any
/// ambiguity during resolution (missing session, deleted account,
/// directory failure) degrades to `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// No authenticated user is associated with the request.
    Anonymous,
    /// A logged-in user, with the roles held at resolution time.
    Authenticated {
        /// The resolved user id.
        user_id: UserId,
        /// Roles read fresh from the ACL graph's bindings, never
        /// cached on the session.
        roles: BTreeSet<RoleId>,
    },
}

impl Identity {
    /// Builds an authenticated identity from a user id and its roles.
    pub fn authenticated<I>(user_id: UserId, roles: I) -> Self
    where
        I: IntoIterator<Item = RoleId>,
    {
        Identity::Authenticated {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// Whether this identity belongs to a logged-in user.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }

    /// The user id, if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    /// The roles held by this identity. Empty for `Anonymous`.
    pub fn roles(&self) -> impl Iterator<Item = &RoleId> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated { roles, .. } => Some(roles.iter()),
        }
        .into_iter()
        .flatten()
    }
}

/// The closed set of actions a request can perform on a resource.
///
/// Derived from the HTTP method of the inbound request; the ACL graph
/// is total over this enum, so every (resource, action) pair yields
/// exactly one verdict per role set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Retrieve a resource (GET, HEAD, OPTIONS).
    Read,
    /// Create a resource (POST).
    Create,
    /// Modify a resource (PUT, PATCH).
    Write,
    /// Remove a resource (DELETE).
    Delete,
}

impl Action {
    /// Maps an HTTP method name onto an action.
    ///
    /// Returns `None` for methods outside the mapped set (CONNECT,
    /// TRACE, extension methods); callers must deny such requests
    /// without consulting the graph.
    pub fn from_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" | "OPTIONS" => Some(Action::Read),
            "POST" => Some(Action::Create),
            "PUT" | "PATCH" => Some(Action::Write),
            "DELETE" => Some(Action::Delete),
            _ => None,
        }
    }

    /// The lowercase name used in datasets and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
