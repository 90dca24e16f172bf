//! Application routes.
//!
//! Reachability of every route here — the auth routes included — is
//! governed by the ACL, not by the handlers: the access middleware has
//! already produced ALLOW by the time any of these run, and the public
//! role's standing grants are what make first contact possible.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{any, get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use warden_acl::{AclGraph, Importer};
use warden_auth::{AccessConfig, AccessLayer, IdentityResolver};
use warden_core::{Identity, RoleId, User, UserDirectory};
use warden_session::{MemorySessionStore, Session, SessionStore};

use crate::directory::MemoryUserDirectory;
use crate::error::Result;

/// Shared handles behind the application.
///
/// Everything is explicit dependency injection: the same handles are
/// given to the middleware, the importer, and the handlers.
#[derive(Clone)]
pub struct AppState {
    /// The session store, written through by login/logout handlers.
    pub sessions: Arc<dyn SessionStore>,
    /// The user directory, also serving credential verification.
    pub users: Arc<MemoryUserDirectory>,
    /// The ACL graph consulted on every request.
    pub acl: Arc<AclGraph>,
}

impl AppState {
    /// Creates a state with empty in-memory stores and a deny-all
    /// graph.
    pub fn new() -> Self {
        AppState {
            sessions: Arc::new(MemorySessionStore::new()),
            users: Arc::new(MemoryUserDirectory::new()),
            acl: Arc::new(AclGraph::new()),
        }
    }

    /// An importer wired to this state's graph.
    pub fn importer(&self, public_role: RoleId) -> Importer {
        Importer::new(self.acl.clone()).with_public_role(public_role)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the application router with the access middleware wrapped
/// around every route, the fallback included.
pub fn router(state: AppState, config: AccessConfig) -> Router {
    let resolver = Arc::new(IdentityResolver::new(
        state.sessions.clone(),
        state.users.clone(),
        state.acl.clone(),
    ));
    Router::new()
        .route("/", get(root))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", any(logout))
        .route("/user", get(current_user))
        .fallback(echo)
        .layer(AccessLayer::new(resolver, config))
        .with_state(state)
}

/// Response shape for a user, with the hash masked.
fn redacted(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "password": "******",
    })
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn root(method: http::Method) -> Json<Value> {
    Json(json!(method.as_str()))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let user = state.users.register(&body.email, &body.name, &body.password)?;
    Ok(Json(redacted(&user)))
}

async fn login(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(session): Extension<Session>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    if identity.is_authenticated() {
        return Ok(Json(json!({ "message": "Already logged in" })));
    }
    let Some(user) = state.users.verify(&body.email, &body.password) else {
        return Ok(Json(json!({ "message": "Bad credentials" })));
    };
    let mut session = session;
    session.login(user.id.clone());
    state.sessions.save(session)?;
    log::info!("login user={}", user.id);
    Ok(Json(json!({ "message": "Logged in", "user": redacted(&user) })))
}

async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>> {
    let mut session = session;
    session.logout();
    let session = state.sessions.save(session)?;
    log::debug!("logout user={:?}", session.user_id);
    Ok(Json(json!({ "message": "Logged out", "session": session })))
}

async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>> {
    if let Some(user_id) = identity.user_id() {
        if let Some(user) = state.users.find_by_id(user_id)? {
            return Ok(Json(redacted(&user)));
        }
    }
    Ok(Json(json!({ "message": "Not logged in" })))
}

/// Catch-all for routes the application never defined; the ACL decides
/// whether anyone reaches it.
async fn echo(method: http::Method, uri: http::Uri) -> Json<Value> {
    Json(json!({ "method": method.as_str(), "path": uri.path() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_masks_the_hash() {
        let user = User {
            id: warden_core::UserId::new("u-1"),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        };
        let value = redacted(&user);
        assert_eq!(value["password"], "******");
        assert!(value.to_string().find("argon2").is_none());
    }
}
