//! `landreg-infra`: ledger-facing side of the land registry.
//!
//! - [`ledger`]: the gateway contract and an in-memory ledger
//! - [`normalize`]: schema-driven conversion of ledger integers
//! - [`client`]: deadlines, receipt checks and error mapping for every call
//! - [`catalog`] and [`workflows`]: the registry operations
//! - [`registry`]: one handle over all of the above

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod ledger;
pub mod normalize;
pub mod outcome;
pub mod registry;
pub mod workflows;

mod integration_tests;

pub use catalog::ParcelCatalog;
pub use client::{CallContext, LedgerClient};
pub use config::EngineConfig;
pub use error::{FailureKind, WorkflowError};
pub use normalize::{NormalizationWarning, Normalized};
pub use outcome::OperationResult;
pub use registry::LandRegistry;
pub use workflows::{PurchaseWorkflow, RegistrationWorkflow, SaleWorkflow};
