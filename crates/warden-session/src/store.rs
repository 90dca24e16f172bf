//! The [`SessionStore`] trait and the in-memory store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use base64::Engine;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::session::{Session, SessionToken};

/// Storage for session records, keyed by token.
///
/// Implementations are shared handles (`Arc<dyn SessionStore>`) injected
/// into the middleware and the request handlers. Concurrent saves for
/// the same token are last-write-wins; session mutation is limited to
/// coarse login/logout flags, so no per-session locking is required.
pub trait SessionStore: Send + Sync {
    /// Loads the session for `token`.
    ///
    /// Fails with [`Error::NotFound`] when the token is absent, expired,
    /// or malformed — never panics on garbage input.
    fn load(&self, token: &str) -> Result<Session>;

    /// Persists the full record, overwriting by token, and returns the
    /// stored session.
    fn save(&self, session: Session) -> Result<Session>;

    /// Allocates a fresh token and an anonymous session, persists it,
    /// and returns it.
    ///
    /// Tokens are cryptographically unguessable and never reused across
    /// distinct created sessions.
    fn create(&self) -> Result<Session>;
}

/// Generates an opaque session token: 256 random bits, base64url
/// without padding.
fn generate_token() -> Result<SessionToken> {
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| Error::token(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// In-memory, process-local session store.
///
/// The only store this engine ships; sharing sessions across processes
/// is explicitly out of scope.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, Session>>,
    /// Sessions idle longer than this load as NotFound. `None` means
    /// sessions never expire.
    idle_ttl: Option<Duration>,
}

impl MemorySessionStore {
    /// Creates an empty store whose sessions never expire.
    pub fn new() -> Self {
        MemorySessionStore {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl: None,
        }
    }

    /// Creates an empty store that expires sessions idle longer than
    /// `ttl`.
    pub fn with_idle_ttl(ttl: Duration) -> Self {
        MemorySessionStore {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl: Some(ttl),
        }
    }

    /// Number of live session records.
    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionToken, Session>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map itself is still a valid last-write-wins state.
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_map(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<SessionToken, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }

    fn is_expired(&self, session: &Session) -> bool {
        match self.idle_ttl {
            Some(ttl) => {
                let idle = Utc::now().signed_duration_since(session.last_accessed_at);
                idle.to_std().map(|idle| idle > ttl).unwrap_or(false)
            }
            None => false,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, token: &str) -> Result<Session> {
        if token.is_empty() {
            return Err(Error::NotFound);
        }
        {
            let map = self.read_map();
            match map.get(token) {
                Some(session) if !self.is_expired(session) => return Ok(session.clone()),
                Some(_) => {}
                None => return Err(Error::NotFound),
            }
        }
        // Drop the stale record; the token stays burned because
        // create() never hands out a token twice.
        self.write_map().remove(token);
        log::debug!("session expired token={token}");
        Err(Error::NotFound)
    }

    fn save(&self, session: Session) -> Result<Session> {
        if session.token.is_empty() {
            return Err(Error::storage("refusing to save a session with an empty token"));
        }
        self.write_map()
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    fn create(&self) -> Result<Session> {
        // Loop on the (astronomically unlikely) token collision rather
        // than ever recycling a live token.
        loop {
            let token = generate_token()?;
            let mut map = self.write_map();
            if map.contains_key(&token) {
                continue;
            }
            let session = Session::anonymous(token.clone());
            map.insert(token, session.clone());
            log::debug!("session created token={}", session.token);
            return Ok(session);
        }
    }
}
