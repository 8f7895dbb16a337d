//! API-side capability guard.
//!
//! Every protected route names exactly one capability; this is the only
//! place that turns a request's principal into an allow/deny decision.

use decorshop_auth::{AuthzError, Permission, authorize};

use crate::context::PrincipalContext;

pub fn authorize_capability(principal: &PrincipalContext, required: &Permission) -> Result<(), AuthzError> {
    authorize(&principal.principal(), required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decorshop_auth::{PrincipalId, Role};

    #[test]
    fn customers_manage_favorites_but_not_the_catalog() {
        let customer = PrincipalContext::new(PrincipalId::new(), None, vec![Role::CUSTOMER]);
        assert!(authorize_capability(&customer, &Permission::FAVORITES_MANAGE).is_ok());
        assert_eq!(
            authorize_capability(&customer, &Permission::CATALOG_MODERATE),
            Err(AuthzError::Forbidden("catalog.moderate".into()))
        );
    }

    #[test]
    fn admin_holds_every_capability() {
        let admin = PrincipalContext::new(PrincipalId::new(), None, vec![Role::ADMIN]);
        for perm in [Permission::CATALOG_CATEGORIZE, Permission::CATALOG_MAINTAIN, Permission::ADMIN_STATS_READ] {
            assert!(authorize_capability(&admin, &perm).is_ok());
        }
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        let nobody = PrincipalContext::new(PrincipalId::new(), None, vec![Role::new("visitor")]);
        assert!(authorize_capability(&nobody, &Permission::FAVORITES_MANAGE).is_err());
    }
}
