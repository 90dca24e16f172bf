//! The session record and its lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::UserId;

/// Opaque session token, carried by the client in a cookie.
pub type SessionToken = String;

/// A server-side session record keyed by an opaque token.
///
/// Created on first contact, mutated by login and logout, and never
/// implicitly destroyed: logout flips the login flag and keeps the
/// record (and its `user_id`) so the session survives across logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The opaque token identifying this session.
    pub token: SessionToken,
    /// The user behind this session, if a login ever happened.
    pub user_id: Option<UserId>,
    /// Whether the session is currently logged in. A retained
    /// `user_id` with `logged_in == false` still resolves to Anonymous.
    pub logged_in: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last seen by the middleware.
    pub last_accessed_at: DateTime<Utc>,
}

impl Session {
    /// Creates a fresh anonymous session for the given token.
    pub fn anonymous(token: SessionToken) -> Self {
        let now = Utc::now();
        Session {
            token,
            user_id: None,
            logged_in: false,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Marks the session as logged in for `user_id`.
    pub fn login(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.logged_in = true;
    }

    /// Clears the login flag. The `user_id` is retained and the
    /// session persists; only the login state is dropped.
    pub fn logout(&mut self) {
        self.logged_in = false;
    }

    /// Updates the last-accessed timestamp.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session_starts_logged_out() {
        let session = Session::anonymous("tok-1".to_string());
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.user_id, None);
        assert!(!session.logged_in);
        assert_eq!(session.created_at, session.last_accessed_at);
    }

    #[test]
    fn test_login_sets_user_and_flag() {
        let mut session = Session::anonymous("tok-1".to_string());
        session.login(UserId::new("u-1"));
        assert!(session.logged_in);
        assert_eq!(session.user_id, Some(UserId::new("u-1")));
    }

    #[test]
    fn test_logout_keeps_user_id() {
        let mut session = Session::anonymous("tok-1".to_string());
        session.login(UserId::new("u-1"));
        session.logout();
        assert!(!session.logged_in);
        // The record survives logout; only the flag is cleared.
        assert_eq!(session.user_id, Some(UserId::new("u-1")));
    }

    #[test]
    fn test_touch_advances_last_accessed() {
        let mut session = Session::anonymous("tok-1".to_string());
        let before = session.last_accessed_at;
        session.touch();
        assert!(session.last_accessed_at >= before);
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = Session::anonymous("tok-1".to_string());
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("loggedIn").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastAccessedAt").is_some());
    }
}
