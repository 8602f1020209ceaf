//! Contract method names understood by the registry contract.

pub const REGISTER_PARCEL: &str = "registerParcel";
pub const REGISTRATION_REQUESTS: &str = "registrationRequests";
pub const ACCEPT_REGISTRATION: &str = "acceptRegistration";
pub const REJECT_REGISTRATION: &str = "rejectRegistration";

pub const OWNED_PARCELS: &str = "ownedParcels";
pub const ALL_PARCELS: &str = "allParcels";

pub const REQUEST_SALE: &str = "requestSale";
pub const SALE_REQUESTS: &str = "saleRequests";
pub const ACCEPT_SALE: &str = "acceptSale";
pub const REJECT_SALE: &str = "rejectSale";

pub const REQUEST_PURCHASE: &str = "requestPurchase";
pub const PURCHASE_REQUESTS: &str = "purchaseRequests";
pub const ACCEPT_PURCHASE: &str = "acceptPurchase";
pub const REJECT_PURCHASE: &str = "rejectPurchase";
