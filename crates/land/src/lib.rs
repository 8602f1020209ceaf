//! Land registry domain module (parcels and pending requests).
//!
//! This crate contains business rules for parcel submissions and the records the
//! ledger hands back, implemented purely as deterministic domain logic (no IO,
//! no ledger access, no transport).

pub mod parcel;
pub mod request;

pub use parcel::{Parcel, ParcelDraft, ValidatedDraft};
pub use request::{PurchaseRequest, RegistrationRequest, SaleRequest};
