use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in session tokens.
///
/// Roles stay opaque strings here; `permissions_for_roles` is the single
/// place that turns them into capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Back-office operator.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    /// Signed-in shopper.
    pub const CUSTOMER: Role = Role(Cow::Borrowed("customer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
