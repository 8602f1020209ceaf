//! `landreg-auth`: explicit authorization boundary for registry operations.
//!
//! Every ledger call is made on behalf of an explicit [`Actor`]; nothing here
//! relies on ambient signer state. This crate is decoupled from transport and
//! from the ledger.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, ensure_acting_as, AuthzError};
pub use permissions::Permission;
pub use principal::Actor;
pub use roles::{role_permissions, Role};
