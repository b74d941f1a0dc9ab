//! Credential verification boundary.
//!
//! Real credential storage (registration, password hashing, lockout)
//! is an external collaborator. The service only depends on this
//! trait: give it a username and password, get back a verified
//! principal or nothing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::UserEntry;

#[derive(Debug, Clone)]
pub struct VerifiedUser {
    pub username: String,
    pub roles: Vec<String>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `None` means the credentials did not verify; the caller must not
    /// learn whether the user exists.
    async fn authenticate(&self, username: &str, password: &str) -> Option<VerifiedUser>;
}

/// Configuration-seeded store used in place of the external
/// collaborator.
pub struct SeededCredentialStore {
    users: HashMap<String, UserEntry>,
}

impl SeededCredentialStore {
    pub fn new(entries: Vec<UserEntry>) -> Self {
        let users = entries
            .into_iter()
            .map(|entry| (entry.username.clone(), entry))
            .collect();
        SeededCredentialStore { users }
    }
}

#[async_trait]
impl CredentialStore for SeededCredentialStore {
    async fn authenticate(&self, username: &str, password: &str) -> Option<VerifiedUser> {
        let entry = self.users.get(username)?;
        if entry.password != password {
            return None;
        }
        Some(VerifiedUser {
            username: entry.username.clone(),
            roles: entry.roles.clone(),
        })
    }
}
