//! Identifier newtypes for users, roles, and permissions.
//!
//! All three are thin wrappers over strings. Keeping them as distinct
//! types stops a role id from ever being used where a user id is
//! expected, which matters in a crate whose whole job is deciding who
//! may do what.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new id from a string.
            pub fn new<S: Into<String>>(id: S) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Unique identifier for a user.
    ///
    /// Opaque to the engine; the server assigns UUIDs, imported
    /// datasets may use any stable string.
    UserId
}

string_id! {
    /// Unique identifier for a role.
    RoleId
}

string_id! {
    /// Unique identifier for a permission.
    PermissionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_creation() {
        let id = UserId::new("u-123");
        assert_eq!(id.as_str(), "u-123");
    }

    #[test]
    fn test_role_id_from_str() {
        let id = RoleId::from("admin");
        assert_eq!(id.as_str(), "admin");
    }

    #[test]
    fn test_permission_id_display() {
        let id = PermissionId::new("p-write");
        assert_eq!(id.to_string(), "p-write");
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(RoleId::new("admin"), RoleId::from("admin".to_string()));
        assert_ne!(RoleId::new("admin"), RoleId::new("member"));
    }

    #[test]
    fn test_id_roundtrip_serialization() {
        let id = UserId::new("u-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u-42\"");
        let deserialized: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_id_ordering() {
        let mut ids = vec![RoleId::new("b"), RoleId::new("a"), RoleId::new("c")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a");
        assert_eq!(ids[2].as_str(), "c");
    }
}
