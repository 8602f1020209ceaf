//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::number::LedgerNumber;

/// Ledger account identifier (signer, owner, buyer, submitter).
///
/// Opaque to this layer; the only rule is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("AccountId: must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a registered parcel (ledger-assigned).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(LedgerNumber);

/// Identifier of a registration, sale or purchase request (ledger-assigned).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(LedgerNumber);

macro_rules! impl_ledger_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: impl Into<LedgerNumber>) -> Self {
                Self(value.into())
            }

            pub fn number(&self) -> LedgerNumber {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(LedgerNumber::Native(value))
            }
        }

        impl From<LedgerNumber> for $t {
            fn from(value: LedgerNumber) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = primitive_types::U256::from_dec_str(s.trim())
                    .map_err(|e| DomainError::invalid_id(format!("{}: {:?}", $name, e)))?;
                Ok(Self(LedgerNumber::from_u256(value)))
            }
        }
    };
}

impl_ledger_newtype!(ParcelId, "ParcelId");
impl_ledger_newtype!(RequestId, "RequestId");
