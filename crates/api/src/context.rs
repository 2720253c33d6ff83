use depot_auth::{Permission, Token};
use depot_core::PrincipalId;

/// Authenticated caller of a request, derived from the bearer token.
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    permissions: Vec<Permission>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, permissions: Vec<Permission>) -> Self {
        Self {
            principal_id,
            permissions,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// The token handed to services.
    pub fn token(&self) -> Token {
        Token {
            subject: Some(self.principal_id),
            permissions: self.permissions.clone(),
        }
    }
}
