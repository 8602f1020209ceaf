use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use landreg_core::{AccountId, DomainError, DomainResult, Entity, LedgerNumber, ParcelId};

/// A parcel submission as entered by its owner, before any ledger call.
///
/// Numeric fields are signed so that negative input coming off the wire is
/// rejected here instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelDraft {
    pub area: i64,
    pub state: String,
    pub district: String,
    pub property_id: String,
    pub survey_number: String,
    pub price: i64,
    pub document_refs: Vec<String>,
}

/// A draft that passed local validation and is ready to be sent to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub area: u64,
    pub location: String,
    pub property_id: String,
    pub survey_number: String,
    pub price: u64,
    pub document_refs: Vec<String>,
}

fn require_text(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

impl ParcelDraft {
    /// Composite location stored on the ledger: `"<state>, <district>"`.
    pub fn location(&self) -> String {
        format!("{}, {}", self.state.trim(), self.district.trim())
    }

    /// Check every submission rule. Nothing here touches the ledger.
    pub fn validate(&self) -> DomainResult<ValidatedDraft> {
        if self.area <= 0 {
            return Err(DomainError::validation("area must be positive"));
        }
        if self.price < 0 {
            return Err(DomainError::validation("price must not be negative"));
        }
        let property_id = require_text(&self.property_id, "property id")?;
        let survey_number = require_text(&self.survey_number, "survey number")?;
        require_text(&self.state, "state")?;
        require_text(&self.district, "district")?;

        if self.document_refs.is_empty() {
            return Err(DomainError::validation(
                "at least one document reference is required",
            ));
        }
        let document_refs = self
            .document_refs
            .iter()
            .map(|r| require_text(r, "document reference"))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ValidatedDraft {
            area: self.area as u64,
            location: self.location(),
            property_id,
            survey_number,
            price: self.price as u64,
            document_refs,
        })
    }
}

/// Registered parcel, as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: ParcelId,
    pub owner: AccountId,
    pub area: LedgerNumber,
    pub location: String,
    pub property_id: String,
    pub survey_number: String,
    pub price: LedgerNumber,
    pub document_refs: Vec<String>,
    /// Milliseconds since the Unix epoch, assigned by the ledger.
    pub registered_at: LedgerNumber,
    pub for_sale: bool,
}

impl Parcel {
    pub fn registered_at_utc(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.registered_at.as_native()?).ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// True when some numeric field was too wide to normalize.
    pub fn has_passthrough_values(&self) -> bool {
        [self.id.number(), self.area, self.price, self.registered_at]
            .iter()
            .any(|n| !n.is_native())
    }
}

impl Entity for Parcel {
    type Id = ParcelId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft() -> ParcelDraft {
        ParcelDraft {
            area: 100,
            state: "Kerala".to_string(),
            district: "Ernakulam".to_string(),
            property_id: "P1".to_string(),
            survey_number: "S-77".to_string(),
            price: 5000,
            document_refs: vec!["deed.pdf".to_string()],
        }
    }

    #[test]
    fn valid_draft_builds_composite_location() {
        let v = draft().validate().unwrap();
        assert_eq!(v.location, "Kerala, Ernakulam");
        assert_eq!(v.area, 100);
        assert_eq!(v.price, 5000);
        assert_eq!(v.document_refs, vec!["deed.pdf".to_string()]);
    }

    #[test]
    fn zero_area_is_rejected() {
        let d = ParcelDraft { area: 0, ..draft() };
        match d.validate().unwrap_err() {
            DomainError::Validation(msg) if msg.contains("area") => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn free_parcel_is_allowed() {
        let d = ParcelDraft { price: 0, ..draft() };
        assert_eq!(d.validate().unwrap().price, 0);
    }

    #[test]
    fn missing_documents_are_rejected() {
        let d = ParcelDraft {
            document_refs: vec![],
            ..draft()
        };
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));

        let d = ParcelDraft {
            document_refs: vec!["  ".to_string()],
            ..draft()
        };
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn blank_property_id_is_rejected() {
        let d = ParcelDraft {
            property_id: " \t".to_string(),
            ..draft()
        };
        match d.validate().unwrap_err() {
            DomainError::Validation(msg) if msg.contains("property id") => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn registered_at_converts_to_utc() {
        let parcel = Parcel {
            id: ParcelId::from(1),
            owner: AccountId::new("0xa").unwrap(),
            area: LedgerNumber::Native(1),
            location: "a, b".to_string(),
            property_id: "P1".to_string(),
            survey_number: "S".to_string(),
            price: LedgerNumber::Native(0),
            document_refs: vec!["d".to_string()],
            registered_at: LedgerNumber::Native(1_700_000_000_000),
            for_sale: false,
        };
        assert_eq!(
            parcel.registered_at_utc().unwrap().timestamp_millis(),
            1_700_000_000_000
        );
        assert!(!parcel.has_passthrough_values());
    }

    proptest! {
        /// Property: negative prices and non-positive areas never validate.
        #[test]
        fn out_of_range_numbers_never_validate(area in i64::MIN..=0i64, price in i64::MIN..0i64) {
            let by_area = ParcelDraft { area, ..draft() };
            prop_assert!(by_area.validate().is_err());
            let by_price = ParcelDraft { price, ..draft() };
            prop_assert!(by_price.validate().is_err());
        }

        /// Property: every positive area and non-negative price is carried unchanged.
        #[test]
        fn in_range_numbers_are_preserved(area in 1i64..=i64::MAX, price in 0i64..=i64::MAX) {
            let v = ParcelDraft { area, price, ..draft() }.validate().unwrap();
            prop_assert_eq!(v.area, area as u64);
            prop_assert_eq!(v.price, price as u64);
        }
    }
}
