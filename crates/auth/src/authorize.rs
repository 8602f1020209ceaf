use std::collections::HashSet;

use thiserror::Error;

use landreg_core::AccountId;

use crate::{role_permissions, Actor, Permission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: account '{account}' is missing permission '{permission}'")]
    Forbidden { account: String, permission: String },

    #[error("account '{actor}' cannot act on behalf of '{subject}'")]
    Impersonation { actor: String, subject: String },
}

/// Authorize an actor for a permission.
///
/// Effective permissions are the union of the role mapping and the actor's
/// direct grants. No IO, no panics, no business logic.
pub fn authorize(actor: &Actor, required: &Permission) -> Result<(), AuthzError> {
    let mut effective: HashSet<String> = actor
        .permissions
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    for role in &actor.roles {
        effective.extend(
            role_permissions(role.as_str())
                .into_iter()
                .map(|p| p.as_str().to_string()),
        );
    }

    if effective.contains("*") || effective.contains(required.as_str()) {
        Ok(())
    } else {
        tracing::warn!(
            account = %actor.account,
            permission = %required,
            "authorization denied"
        );
        Err(AuthzError::Forbidden {
            account: actor.account.to_string(),
            permission: required.as_str().to_string(),
        })
    }
}

/// Owner/buyer arguments must name the signing account itself.
pub fn ensure_acting_as(actor: &Actor, subject: &AccountId) -> Result<(), AuthzError> {
    if &actor.account == subject {
        Ok(())
    } else {
        Err(AuthzError::Impersonation {
            actor: actor.account.to_string(),
            subject: subject.to_string(),
        })
    }
}
