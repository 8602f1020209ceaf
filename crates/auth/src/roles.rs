use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
///
/// Roles are opaque strings; [`role_permissions`] maps the built-in ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Registry administrator: decides every pending request.
    pub const ADMINISTRATOR: Role = Role(Cow::Borrowed("administrator"));
    /// Ordinary account holder: submits, lists and buys parcels.
    pub const LANDHOLDER: Role = Role(Cow::Borrowed("landholder"));

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

/// Permissions granted by a role name. Unknown roles grant nothing.
pub fn role_permissions(role: &str) -> Vec<Permission> {
    match role {
        "administrator" => vec![Permission::new("*")],
        "landholder" => vec![
            Permission::PARCELS_READ,
            Permission::REGISTRATION_SUBMIT,
            Permission::SALE_REQUEST,
            Permission::PURCHASE_REQUEST,
        ],
        _ => vec![],
    }
}
