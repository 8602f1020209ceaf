use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "parcels.read").
/// The wildcard permission `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const PARCELS_READ: Permission = Permission(Cow::Borrowed("parcels.read"));
    pub const REGISTRATION_SUBMIT: Permission = Permission(Cow::Borrowed("registration.submit"));
    pub const REGISTRATION_DECIDE: Permission = Permission(Cow::Borrowed("registration.decide"));
    pub const SALE_REQUEST: Permission = Permission(Cow::Borrowed("sale.request"));
    pub const SALE_DECIDE: Permission = Permission(Cow::Borrowed("sale.decide"));
    pub const PURCHASE_REQUEST: Permission = Permission(Cow::Borrowed("purchase.request"));
    pub const PURCHASE_DECIDE: Permission = Permission(Cow::Borrowed("purchase.decide"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
