//! `landreg-core`: land registry foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no ledger or transport concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod number;
pub mod status;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, ParcelId, RequestId};
pub use number::LedgerNumber;
pub use status::{Decision, RequestStatus};

/// Ledger-native unsigned 256-bit integer.
pub use primitive_types::U256;
