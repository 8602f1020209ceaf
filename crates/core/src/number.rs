//! Host-side representation of ledger integers.

use core::fmt;

use primitive_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A ledger integer after normalization.
///
/// The ledger speaks 256-bit unsigned integers. Values that fit in `u64` are
/// carried natively; anything wider is kept as the untouched original and
/// tagged as not normalizable. Nothing is ever truncated.
///
/// Serialized as a JSON number when native and as a decimal string otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LedgerNumber {
    Native(u64),
    Passthrough(U256),
}

impl LedgerNumber {
    /// Normalize a ledger value. Lossless in both directions.
    pub fn from_u256(value: U256) -> Self {
        if value.bits() <= 64 {
            Self::Native(value.low_u64())
        } else {
            Self::Passthrough(value)
        }
    }

    /// Re-encode for the ledger. Reproduces the original value exactly.
    pub fn to_u256(self) -> U256 {
        match self {
            Self::Native(v) => U256::from(v),
            Self::Passthrough(v) => v,
        }
    }

    pub fn as_native(self) -> Option<u64> {
        match self {
            Self::Native(v) => Some(v),
            Self::Passthrough(_) => None,
        }
    }

    pub fn is_native(self) -> bool {
        matches!(self, Self::Native(_))
    }
}

impl From<u64> for LedgerNumber {
    fn from(value: u64) -> Self {
        Self::Native(value)
    }
}

impl From<U256> for LedgerNumber {
    fn from(value: U256) -> Self {
        Self::from_u256(value)
    }
}

impl From<LedgerNumber> for U256 {
    fn from(value: LedgerNumber) -> Self {
        value.to_u256()
    }
}

impl fmt::Display for LedgerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(v) => fmt::Display::fmt(v, f),
            Self::Passthrough(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl Serialize for LedgerNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Native(v) => serializer.serialize_u64(*v),
            Self::Passthrough(v) => serializer.serialize_str(&v.to_string()),
        }
    }
}

struct LedgerNumberVisitor;

impl<'de> Visitor<'de> for LedgerNumberVisitor {
    type Value = LedgerNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(LedgerNumber::Native(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(LedgerNumber::Native)
            .map_err(|_| E::custom("ledger numbers are unsigned"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        U256::from_dec_str(v)
            .map(LedgerNumber::from_u256)
            .map_err(|e| E::custom(format!("invalid ledger number '{v}': {e:?}")))
    }
}

impl<'de> Deserialize<'de> for LedgerNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LedgerNumberVisitor)
    }
}
