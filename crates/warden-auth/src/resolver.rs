//! Session-to-identity resolution.

use std::sync::Arc;

use warden_acl::AclGraph;
use warden_core::{Identity, UserDirectory};
use warden_session::{Session, SessionStore};

use crate::error::Result;

/// The outcome of resolving a request's session token.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// The resolved identity; Anonymous on any ambiguity.
    pub identity: Identity,
    /// The session backing this request — freshly created when the
    /// token was absent or unknown.
    pub session: Session,
    /// Whether `session` was created by this resolution. The caller
    /// must hand the new token back to the client.
    pub created: bool,
}

/// Resolves a session token to an [`Identity`].
///
/// All collaborators are injected shared handles; the resolver owns no
/// ambient state. Any ambiguity — missing session, logged-out session,
/// deleted account, directory failure — degrades to Anonymous rather
/// than erroring, so a stale cookie can never crash a request or leak
/// privileges.
pub struct IdentityResolver {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserDirectory>,
    acl: Arc<AclGraph>,
}

impl IdentityResolver {
    /// Creates a resolver over the given collaborators.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
        acl: Arc<AclGraph>,
    ) -> Self {
        IdentityResolver {
            sessions,
            users,
            acl,
        }
    }

    /// The session store this resolver reads and creates sessions in.
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    /// The ACL graph consulted for role bindings and authorization.
    pub fn graph(&self) -> &AclGraph {
        self.acl.as_ref()
    }

    /// Resolves `token` to an identity, creating a session when the
    /// token is absent or unknown.
    pub fn resolve(&self, token: Option<&str>) -> Result<ResolvedRequest> {
        let (session, created) = match token {
            Some(token) => match self.sessions.load(token) {
                Ok(session) => (session, false),
                Err(err) if err.is_not_found() => (self.sessions.create()?, true),
                Err(err) => return Err(err.into()),
            },
            None => (self.sessions.create()?, true),
        };
        let identity = self.identity_for(&session);
        Ok(ResolvedRequest {
            identity,
            session,
            created,
        })
    }

    /// Derives the identity behind a session record.
    ///
    /// Roles are read fresh from the graph's bindings on every call, so
    /// a revocation takes effect on the very next request.
    fn identity_for(&self, session: &Session) -> Identity {
        if !session.logged_in {
            return Identity::Anonymous;
        }
        let Some(user_id) = &session.user_id else {
            return Identity::Anonymous;
        };
        match self.users.find_by_id(user_id) {
            Ok(Some(user)) => {
                let roles = self.acl.roles_for(&user.id);
                Identity::Authenticated {
                    user_id: user.id,
                    roles,
                }
            }
            Ok(None) => {
                // Deleted account with a surviving session: fail
                // closed, not an error.
                log::debug!("session user {user_id} no longer exists, resolving anonymous");
                Identity::Anonymous
            }
            Err(err) => {
                log::warn!("user lookup for {user_id} failed, resolving anonymous: {err}");
                Identity::Anonymous
            }
        }
    }
}
