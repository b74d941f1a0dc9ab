use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Role marker granting administrative routes.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
/// Role marker granting ordinary user routes.
pub const ROLE_USER: &str = "ROLE_USER";

/// Signed token payload.
///
/// Wire names are the compact-token conventions (`sub`, `roles`, `iat`,
/// `exp`); timestamps are epoch seconds. Role order is preserved for
/// display only — authorization is set membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Verified identity attached to a single request.
///
/// Built fresh from [`Claims`] on every successful verification and
/// never persisted; downstream handlers read it from the request
/// context.
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: String,
    pub roles: HashSet<String>,
    pub is_admin: bool,
    pub is_user: bool,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Self {
        Principal::from_parts(claims.sub.clone(), claims.roles.iter().cloned())
    }

    /// Build from an already-verified subject and role list, e.g. the
    /// response of a remote validation endpoint.
    pub fn from_parts(
        subject: impl Into<String>,
        roles: impl IntoIterator<Item = String>,
    ) -> Self {
        let roles: HashSet<String> = roles.into_iter().collect();
        let is_admin = roles.contains(ROLE_ADMIN);
        let is_user = roles.contains(ROLE_USER);
        Principal {
            subject: subject.into(),
            roles,
            is_admin,
            is_user,
        }
    }

    /// Exact string match against the role vocabulary.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
