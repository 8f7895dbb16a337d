use decorshop_auth::{Principal, PrincipalId, Role};

/// Principal context for a request (authenticated identity + roles).
///
/// Inserted by the auth middleware; handlers behind it can rely on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    email: Option<String>,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, email: Option<String>, roles: Vec<Role>) -> Self {
        Self {
            principal_id,
            email,
            roles,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Resolve effective capabilities for authorization checks.
    pub fn principal(&self) -> Principal {
        Principal::from_roles(self.principal_id, self.roles.clone())
    }
}
