use serde::{Deserialize, Serialize};

use landreg_core::AccountId;

use crate::{Permission, Role};

/// The principal behind one registry operation.
///
/// `account` doubles as the ledger signer for any transaction the operation
/// submits, so the signer is always explicit per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub account: AccountId,
    pub roles: Vec<Role>,
    /// Permissions granted directly, on top of the role mapping.
    pub permissions: Vec<Permission>,
}

impl Actor {
    pub fn new(account: AccountId, roles: Vec<Role>) -> Self {
        Self {
            account,
            roles,
            permissions: Vec::new(),
        }
    }

    pub fn administrator(account: AccountId) -> Self {
        Self::new(account, vec![Role::ADMINISTRATOR])
    }

    pub fn landholder(account: AccountId) -> Self {
        Self::new(account, vec![Role::LANDHOLDER])
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }
}
