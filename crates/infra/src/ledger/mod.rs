//! Ledger boundary.
//!
//! The ledger is the only owner of durable registry state. This module defines
//! the request/response contract the registry consumes, without assuming any
//! particular chain or client library, plus an in-memory implementation for
//! tests and local development.

pub mod gateway;
pub mod in_memory;
pub mod methods;

pub use gateway::{
    ContractCall, LedgerError, LedgerGateway, RawRecord, RawValue, ReceiptStatus, Revert,
    TransactionReceipt,
};
pub use in_memory::{InMemoryLedger, ParcelSeed};
