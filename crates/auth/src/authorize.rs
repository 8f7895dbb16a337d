use thiserror::Error;

use crate::{Permission, PrincipalId, Role, permissions_for_roles};

/// A fully resolved caller for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve effective permissions from the role policy.
    pub fn from_roles(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        let permissions = permissions_for_roles(&roles);
        Self {
            principal_id,
            roles,
            permissions,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Pure capability check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = principal
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
