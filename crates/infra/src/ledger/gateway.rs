use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use landreg_core::{AccountId, LedgerNumber, ParcelId, RequestId, U256};

/// A value as the ledger returns it: integers are always 256-bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Int(U256),
    Text(String),
    Bool(bool),
    List(Vec<RawValue>),
    Record(RawRecord),
}

/// A struct-shaped ledger value, keyed by field name.
pub type RawRecord = BTreeMap<String, RawValue>;

impl RawValue {
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Int(_) => "int",
            RawValue::Text(_) => "text",
            RawValue::Bool(_) => "bool",
            RawValue::List(_) => "list",
            RawValue::Record(_) => "record",
        }
    }
}

impl From<U256> for RawValue {
    fn from(value: U256) -> Self {
        RawValue::Int(value)
    }
}

impl From<u64> for RawValue {
    fn from(value: u64) -> Self {
        RawValue::Int(U256::from(value))
    }
}

impl From<LedgerNumber> for RawValue {
    fn from(value: LedgerNumber) -> Self {
        RawValue::Int(value.to_u256())
    }
}

impl From<ParcelId> for RawValue {
    fn from(value: ParcelId) -> Self {
        value.number().into()
    }
}

impl From<RequestId> for RawValue {
    fn from(value: RequestId) -> Self {
        value.number().into()
    }
}

impl From<&AccountId> for RawValue {
    fn from(value: &AccountId) -> Self {
        RawValue::Text(value.as_str().to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        RawValue::List(value.into_iter().map(RawValue::Text).collect())
    }
}

/// One contract invocation: method name plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub method: &'static str,
    pub args: Vec<RawValue>,
}

impl ContractCall {
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<RawValue>) -> Self {
        self.args.push(value.into());
        self
    }
}

/// Business rule the contract refused to violate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Revert {
    #[error("caller does not own the parcel")]
    NotOwner,
    #[error("parcel is not listed for sale")]
    NotForSale,
    #[error("parcel has already been sold")]
    AlreadySold,
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("no such record")]
    NotFound,
    #[error("signer is not allowed to call this method")]
    Unauthorized,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    Committed,
    Reverted(Revert),
}

/// Result of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: U256,
    pub status: ReceiptStatus,
    /// Value returned by the contract method, if any (e.g. a new request id).
    pub output: Option<RawValue>,
}

impl TransactionReceipt {
    pub fn is_committed(&self) -> bool {
        self.status == ReceiptStatus::Committed
    }
}

/// Ledger gateway failure.
///
/// - `Unavailable`: the ledger could not be reached (transient).
/// - `Reverted`: the contract rejected the call (deterministic).
/// - `Malformed`: the ledger answered with something the registry cannot read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("transaction reverted: {0}")]
    Reverted(#[from] Revert),

    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

/// Request/response access to the authoritative ledger.
///
/// The ledger is assumed consistent and serializes transactions itself; the
/// registry never holds locks of its own around these calls.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Submit a state-mutating transaction signed by `signer`.
    async fn submit_transaction(
        &self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Run a read-only contract method.
    async fn query(&self, call: &ContractCall) -> Result<RawValue, LedgerError>;
}

#[async_trait]
impl<G> LedgerGateway for Arc<G>
where
    G: LedgerGateway + ?Sized,
{
    async fn submit_transaction(
        &self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<TransactionReceipt, LedgerError> {
        (**self).submit_transaction(call, signer).await
    }

    async fn query(&self, call: &ContractCall) -> Result<RawValue, LedgerError> {
        (**self).query(call).await
    }
}
