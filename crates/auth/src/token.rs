use serde::{Deserialize, Serialize};

use depot_core::PrincipalId;

use crate::{JwtClaims, Permission, authorize};

/// Authenticated caller as seen by the service layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<PrincipalId>,
    pub permissions: Vec<Permission>,
}

impl Token {
    /// Token without a known subject (tests, internal callers).
    pub fn with_permissions<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self {
            subject: None,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, required: &Permission) -> bool {
        authorize(&self.permissions, required)
    }
}

impl From<JwtClaims> for Token {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject: Some(claims.sub),
            permissions: claims.permissions,
        }
    }
}
