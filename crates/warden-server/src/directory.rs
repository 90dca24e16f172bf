//! In-memory user directory with argon2id credentials.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use warden_core::{User, UserDirectory, UserId};

use crate::error::{Error, Result};

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| Error::password_hash(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| Error::password_hash(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::password_hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

/// Process-local user directory.
///
/// Registration assigns UUID user ids; emails are unique. Lookups by
/// id serve the identity resolver, lookups by email serve login.
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
    by_email: RwLock<HashMap<String, UserId>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        MemoryUserDirectory {
            users: RwLock::new(HashMap::new()),
            by_email: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new user, hashing the password.
    pub fn register(&self, email: &str, name: &str, password: &str) -> Result<User> {
        let email = email.trim().to_ascii_lowercase();
        let mut by_email = self.by_email.write().unwrap_or_else(|e| e.into_inner());
        if by_email.contains_key(&email) {
            return Err(Error::EmailTaken { email });
        }
        let user = User {
            id: UserId::new(uuid::Uuid::new_v4().to_string()),
            email: email.clone(),
            name: name.to_string(),
            password_hash: hash_password(password)?,
        };
        by_email.insert(email, user.id.clone());
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id.clone(), user.clone());
        log::info!("user registered id={} email={}", user.id, user.email);
        Ok(user)
    }

    /// Inserts a prebuilt user record, for seeding known ids (tests,
    /// bootstrap admin accounts). Replaces any user with the same id.
    pub fn insert(&self, user: User) {
        self.by_email
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.email.clone(), user.id.clone());
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id.clone(), user);
    }

    /// Removes a user by id.
    pub fn remove(&self, id: &UserId) -> Option<User> {
        let user = self
            .users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)?;
        self.by_email
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&user.email);
        Some(user)
    }

    /// Verifies credentials, returning the user on a match.
    ///
    /// An unknown email and a wrong password are indistinguishable to
    /// the caller.
    pub fn verify(&self, email: &str, password: &str) -> Option<User> {
        let email = email.trim().to_ascii_lowercase();
        let id = self
            .by_email
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&email)
            .cloned()?;
        let user = self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()?;
        verify_password(&user.password_hash, password).then_some(user)
    }
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for MemoryUserDirectory {
    fn find_by_id(&self, id: &UserId) -> warden_core::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned())
    }
}
