//! Ledger integer normalization.
//!
//! Every record the ledger returns is decoded against an explicit schema that
//! names each field and its kind. Integer fields are converted to
//! [`LedgerNumber`]: native `u64` when lossless, otherwise the untouched
//! original plus a [`NormalizationWarning`]. Nothing is truncated and no field
//! is discovered by probing record keys at runtime.

use std::collections::BTreeMap;

use serde::Serialize;

use landreg_core::{AccountId, LedgerNumber, ParcelId, RequestId, RequestStatus, U256};
use landreg_land::{Parcel, PurchaseRequest, RegistrationRequest, SaleRequest};

use crate::ledger::{LedgerError, RawValue};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    Flag,
    TextList,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Field layout of one ledger record type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub record: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordSchema {
    pub fn numeric_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Number)
            .map(|f| f.name)
    }
}

pub const PARCEL_SCHEMA: RecordSchema = RecordSchema {
    record: "parcel",
    fields: &[
        field("id", FieldKind::Number),
        field("owner", FieldKind::Text),
        field("area", FieldKind::Number),
        field("location", FieldKind::Text),
        field("propertyId", FieldKind::Text),
        field("surveyNumber", FieldKind::Text),
        field("price", FieldKind::Number),
        field("documents", FieldKind::TextList),
        field("registeredAt", FieldKind::Number),
        field("forSale", FieldKind::Flag),
    ],
};

pub const REGISTRATION_SCHEMA: RecordSchema = RecordSchema {
    record: "registration_request",
    fields: &[
        field("id", FieldKind::Number),
        field("submitter", FieldKind::Text),
        field("area", FieldKind::Number),
        field("location", FieldKind::Text),
        field("propertyId", FieldKind::Text),
        field("surveyNumber", FieldKind::Text),
        field("price", FieldKind::Number),
        field("documents", FieldKind::TextList),
        field("submittedAt", FieldKind::Number),
        field("status", FieldKind::Number),
    ],
};

pub const SALE_SCHEMA: RecordSchema = RecordSchema {
    record: "sale_request",
    fields: &[
        field("id", FieldKind::Number),
        field("parcelId", FieldKind::Number),
        field("seller", FieldKind::Text),
        field("requestedAt", FieldKind::Number),
        field("status", FieldKind::Number),
    ],
};

pub const PURCHASE_SCHEMA: RecordSchema = RecordSchema {
    record: "purchase_request",
    fields: &[
        field("id", FieldKind::Number),
        field("parcelId", FieldKind::Number),
        field("buyer", FieldKind::Text),
        field("seller", FieldKind::Text),
        field("requestedAt", FieldKind::Number),
        field("status", FieldKind::Number),
    ],
};

/// A ledger integer that did not fit `u64` and was passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationWarning {
    pub record: &'static str,
    pub field: &'static str,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: U256,
}

fn serialize_decimal<S: serde::Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

impl core::fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{} = {} exceeds the native integer range; passed through unmodified",
            self.record, self.field, self.value
        )
    }
}

/// Decoded value plus every warning raised while decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T> {
    pub value: T,
    pub warnings: Vec<NormalizationWarning>,
}

impl<T> Normalized<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Normalized<U> {
        Normalized {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Number(LedgerNumber),
    Text(String),
    Flag(bool),
    TextList(Vec<String>),
}

/// One record after schema-driven normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    record: &'static str,
    values: BTreeMap<&'static str, FieldValue>,
}

impl NormalizedRecord {
    fn get(&self, name: &str) -> Result<&FieldValue, LedgerError> {
        self.values.get(name).ok_or_else(|| {
            LedgerError::Malformed(format!("{}: field '{name}' is not in the schema", self.record))
        })
    }

    fn wrong_kind(&self, name: &str, expected: &str) -> LedgerError {
        LedgerError::Malformed(format!("{}.{name}: expected {expected}", self.record))
    }

    pub fn number(&self, name: &str) -> Result<LedgerNumber, LedgerError> {
        match self.get(name)? {
            FieldValue::Number(n) => Ok(*n),
            _ => Err(self.wrong_kind(name, "number")),
        }
    }

    pub fn text(&self, name: &str) -> Result<String, LedgerError> {
        match self.get(name)? {
            FieldValue::Text(t) => Ok(t.clone()),
            _ => Err(self.wrong_kind(name, "text")),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, LedgerError> {
        match self.get(name)? {
            FieldValue::Flag(b) => Ok(*b),
            _ => Err(self.wrong_kind(name, "flag")),
        }
    }

    pub fn text_list(&self, name: &str) -> Result<Vec<String>, LedgerError> {
        match self.get(name)? {
            FieldValue::TextList(items) => Ok(items.clone()),
            _ => Err(self.wrong_kind(name, "text list")),
        }
    }

    pub fn account(&self, name: &str) -> Result<AccountId, LedgerError> {
        AccountId::new(self.text(name)?)
            .map_err(|e| LedgerError::Malformed(format!("{}.{name}: {e}", self.record)))
    }

    pub fn status(&self, name: &str) -> Result<RequestStatus, LedgerError> {
        let n = self.number(name)?;
        n.as_native()
            .and_then(RequestStatus::from_code)
            .ok_or_else(|| {
                LedgerError::Malformed(format!("{}.{name}: unknown status code {n}", self.record))
            })
    }
}

/// Collects warnings across the records of one ledger response.
#[derive(Debug, Default)]
pub struct Normalizer {
    warnings: Vec<NormalizationWarning>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a single integer, recording a warning when it passes through.
    pub fn number(&mut self, record: &'static str, field: &'static str, value: U256) -> LedgerNumber {
        let n = LedgerNumber::from_u256(value);
        if !n.is_native() {
            self.warnings.push(NormalizationWarning {
                record,
                field,
                value,
            });
        }
        n
    }

    /// Normalize one raw record field-by-field as the schema dictates.
    pub fn record(
        &mut self,
        schema: &RecordSchema,
        raw: &RawValue,
    ) -> Result<NormalizedRecord, LedgerError> {
        let RawValue::Record(fields) = raw else {
            return Err(LedgerError::Malformed(format!(
                "{}: expected record, got {}",
                schema.record,
                raw.kind()
            )));
        };

        let mut values = BTreeMap::new();
        for spec in schema.fields {
            let value = fields.get(spec.name).ok_or_else(|| {
                LedgerError::Malformed(format!("{}: missing field '{}'", schema.record, spec.name))
            })?;
            let normalized = match (spec.kind, value) {
                (FieldKind::Number, RawValue::Int(v)) => {
                    FieldValue::Number(self.number(schema.record, spec.name, *v))
                }
                (FieldKind::Text, RawValue::Text(t)) => FieldValue::Text(t.clone()),
                (FieldKind::Flag, RawValue::Bool(b)) => FieldValue::Flag(*b),
                (FieldKind::TextList, RawValue::List(items)) => FieldValue::TextList(
                    items
                        .iter()
                        .map(|item| match item {
                            RawValue::Text(t) => Ok(t.clone()),
                            other => Err(LedgerError::Malformed(format!(
                                "{}.{}: expected text items, got {}",
                                schema.record,
                                spec.name,
                                other.kind()
                            ))),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                (kind, other) => {
                    return Err(LedgerError::Malformed(format!(
                        "{}.{}: expected {kind:?}, got {}",
                        schema.record,
                        spec.name,
                        other.kind()
                    )));
                }
            };
            values.insert(spec.name, normalized);
        }

        Ok(NormalizedRecord {
            record: schema.record,
            values,
        })
    }

    /// Finish the response: log every warning and hand it to the caller.
    pub fn finish<T>(self, value: T) -> Normalized<T> {
        for w in &self.warnings {
            tracing::warn!(
                record = w.record,
                field = w.field,
                value = %w.value,
                "ledger value not normalizable; passed through"
            );
        }
        Normalized {
            value,
            warnings: self.warnings,
        }
    }
}

/// A ledger record type with a fixed schema.
pub trait LedgerRecord: Sized {
    const SCHEMA: RecordSchema;

    fn from_record(record: &NormalizedRecord) -> Result<Self, LedgerError>;
}

impl LedgerRecord for Parcel {
    const SCHEMA: RecordSchema = PARCEL_SCHEMA;

    fn from_record(r: &NormalizedRecord) -> Result<Self, LedgerError> {
        Ok(Parcel {
            id: ParcelId::new(r.number("id")?),
            owner: r.account("owner")?,
            area: r.number("area")?,
            location: r.text("location")?,
            property_id: r.text("propertyId")?,
            survey_number: r.text("surveyNumber")?,
            price: r.number("price")?,
            document_refs: r.text_list("documents")?,
            registered_at: r.number("registeredAt")?,
            for_sale: r.flag("forSale")?,
        })
    }
}

impl LedgerRecord for RegistrationRequest {
    const SCHEMA: RecordSchema = REGISTRATION_SCHEMA;

    fn from_record(r: &NormalizedRecord) -> Result<Self, LedgerError> {
        Ok(RegistrationRequest {
            id: RequestId::new(r.number("id")?),
            submitter: r.account("submitter")?,
            area: r.number("area")?,
            location: r.text("location")?,
            property_id: r.text("propertyId")?,
            survey_number: r.text("surveyNumber")?,
            price: r.number("price")?,
            document_refs: r.text_list("documents")?,
            submitted_at: r.number("submittedAt")?,
            status: r.status("status")?,
        })
    }
}

impl LedgerRecord for SaleRequest {
    const SCHEMA: RecordSchema = SALE_SCHEMA;

    fn from_record(r: &NormalizedRecord) -> Result<Self, LedgerError> {
        Ok(SaleRequest {
            id: RequestId::new(r.number("id")?),
            parcel_id: ParcelId::new(r.number("parcelId")?),
            seller: r.account("seller")?,
            requested_at: r.number("requestedAt")?,
            status: r.status("status")?,
        })
    }
}

impl LedgerRecord for PurchaseRequest {
    const SCHEMA: RecordSchema = PURCHASE_SCHEMA;

    fn from_record(r: &NormalizedRecord) -> Result<Self, LedgerError> {
        Ok(PurchaseRequest {
            id: RequestId::new(r.number("id")?),
            parcel_id: ParcelId::new(r.number("parcelId")?),
            buyer: r.account("buyer")?,
            seller: r.account("seller")?,
            requested_at: r.number("requestedAt")?,
            status: r.status("status")?,
        })
    }
}

/// Decode a list-shaped query result into typed, normalized records.
///
/// Ledger order is preserved.
pub fn normalize_list<T: LedgerRecord>(raw: &RawValue) -> Result<Normalized<Vec<T>>, LedgerError> {
    let RawValue::List(rows) = raw else {
        return Err(LedgerError::Malformed(format!(
            "{}: expected list, got {}",
            T::SCHEMA.record,
            raw.kind()
        )));
    };

    let mut normalizer = Normalizer::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let record = normalizer.record(&T::SCHEMA, row)?;
        out.push(T::from_record(&record)?);
    }
    Ok(normalizer.finish(out))
}

/// Normalize a single integer returned by a transaction (e.g. a new request id).
pub fn normalize_output(
    record: &'static str,
    output: Option<&RawValue>,
) -> Result<Normalized<LedgerNumber>, LedgerError> {
    match output {
        Some(RawValue::Int(v)) => {
            let mut normalizer = Normalizer::new();
            let n = normalizer.number(record, "output", *v);
            Ok(normalizer.finish(n))
        }
        Some(other) => Err(LedgerError::Malformed(format!(
            "{record}: expected int output, got {}",
            other.kind()
        ))),
        None => Err(LedgerError::Malformed(format!(
            "{record}: transaction returned no output"
        ))),
    }
}
