use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Capability identifier (e.g. `"catalog.moderate"`).
///
/// The wildcard `"*"` grants every capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));

    /// Approve, return to moderation, bulk confirm/unconfirm/delete.
    pub const CATALOG_MODERATE: Permission = Permission(Cow::Borrowed("catalog.moderate"));
    /// Assign categories to products (may create categories).
    pub const CATALOG_CATEGORIZE: Permission = Permission(Cow::Borrowed("catalog.categorize"));
    pub const CATALOG_IMPORT: Permission = Permission(Cow::Borrowed("catalog.import"));
    pub const CATALOG_EXPORT: Permission = Permission(Cow::Borrowed("catalog.export"));
    /// Run maintenance jobs (duplicate cleanup).
    pub const CATALOG_MAINTAIN: Permission = Permission(Cow::Borrowed("catalog.maintain"));
    pub const ADMIN_STATS_READ: Permission = Permission(Cow::Borrowed("admin.stats.read"));
    pub const FAVORITES_MANAGE: Permission = Permission(Cow::Borrowed("favorites.manage"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role → capability policy.
///
/// `admin` holds the wildcard; `customer` may only manage favorites.
/// Unknown roles grant nothing.
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    let mut granted = Vec::new();
    for role in roles {
        let perms = match role.as_str() {
            "admin" => vec![Permission::WILDCARD],
            "customer" => vec![Permission::FAVORITES_MANAGE],
            _ => Vec::new(),
        };
        for p in perms {
            if !granted.contains(&p) {
                granted.push(p);
            }
        }
    }
    granted
}
