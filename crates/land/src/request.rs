use serde::{Deserialize, Serialize};

use landreg_core::{AccountId, Entity, LedgerNumber, ParcelId, RequestId, RequestStatus};

/// Pending (or decided) parcel submission awaiting an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub id: RequestId,
    pub submitter: AccountId,
    pub area: LedgerNumber,
    pub location: String,
    pub property_id: String,
    pub survey_number: String,
    pub price: LedgerNumber,
    pub document_refs: Vec<String>,
    pub submitted_at: LedgerNumber,
    pub status: RequestStatus,
}

/// Owner's intent to list a parcel for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub id: RequestId,
    pub parcel_id: ParcelId,
    pub seller: AccountId,
    pub requested_at: LedgerNumber,
    pub status: RequestStatus,
}

/// Buyer's intent to acquire a listed parcel.
///
/// `seller` is the owner at the time the request was made; by acceptance time
/// the parcel may already belong to someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub id: RequestId,
    pub parcel_id: ParcelId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub requested_at: LedgerNumber,
    pub status: RequestStatus,
}

macro_rules! impl_request_entity {
    ($t:ty) => {
        impl Entity for $t {
            type Id = RequestId;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }

        impl $t {
            pub fn is_pending(&self) -> bool {
                self.status == RequestStatus::Pending
            }
        }
    };
}

impl_request_entity!(RegistrationRequest);
impl_request_entity!(SaleRequest);
impl_request_entity!(PurchaseRequest);
