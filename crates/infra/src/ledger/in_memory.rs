use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use landreg_core::{AccountId, Decision, RequestStatus, U256};

use super::gateway::{
    ContractCall, LedgerError, LedgerGateway, RawRecord, RawValue, ReceiptStatus, Revert,
    TransactionReceipt,
};
use super::methods;

#[derive(Debug, Clone)]
struct ParcelEntry {
    id: U256,
    owner: AccountId,
    area: U256,
    location: String,
    property_id: String,
    survey_number: String,
    price: U256,
    documents: Vec<String>,
    registered_at: U256,
    for_sale: bool,
}

#[derive(Debug, Clone)]
struct RegistrationEntry {
    id: U256,
    submitter: AccountId,
    area: U256,
    location: String,
    property_id: String,
    survey_number: String,
    price: U256,
    documents: Vec<String>,
    submitted_at: U256,
    status: RequestStatus,
}

#[derive(Debug, Clone)]
struct SaleEntry {
    id: U256,
    parcel_id: U256,
    seller: AccountId,
    requested_at: U256,
    status: RequestStatus,
}

#[derive(Debug, Clone)]
struct PurchaseEntry {
    id: U256,
    parcel_id: U256,
    buyer: AccountId,
    seller: AccountId,
    requested_at: U256,
    status: RequestStatus,
}

/// Parcel inserted directly into ledger state, bypassing the registration flow.
///
/// Lets tests place values on the ledger that no validated draft could
/// produce (e.g. areas wider than 64 bits).
#[derive(Debug, Clone)]
pub struct ParcelSeed {
    pub owner: AccountId,
    pub area: U256,
    pub location: String,
    pub property_id: String,
    pub survey_number: String,
    pub price: U256,
    pub documents: Vec<String>,
    pub registered_at: U256,
    pub for_sale: bool,
}

#[derive(Debug, Default)]
struct LedgerState {
    block_number: u64,
    next_parcel_id: u64,
    next_request_id: u64,
    parcels: Vec<ParcelEntry>,
    registrations: Vec<RegistrationEntry>,
    sales: Vec<SaleEntry>,
    purchases: Vec<PurchaseEntry>,
}

#[derive(Debug, Default)]
struct Settings {
    administrators: HashSet<AccountId>,
    offline: bool,
    latency: Duration,
}

/// In-memory registry contract.
///
/// Intended for tests/dev. Every transaction runs under a single write lock,
/// so transactions are atomic and totally ordered, like blocks on a chain.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    settings: RwLock<Settings>,
}

fn now_millis() -> U256 {
    U256::from(u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0))
}

fn poisoned() -> LedgerError {
    LedgerError::Unavailable("ledger state lock poisoned".to_string())
}

fn arg<'a>(call: &'a ContractCall, idx: usize) -> Result<&'a RawValue, LedgerError> {
    call.args.get(idx).ok_or_else(|| {
        LedgerError::Malformed(format!("{}: missing argument {idx}", call.method))
    })
}

fn arg_int(call: &ContractCall, idx: usize) -> Result<U256, LedgerError> {
    match arg(call, idx)? {
        RawValue::Int(v) => Ok(*v),
        other => Err(LedgerError::Malformed(format!(
            "{}: argument {idx} must be int, got {}",
            call.method,
            other.kind()
        ))),
    }
}

fn arg_text(call: &ContractCall, idx: usize) -> Result<String, LedgerError> {
    match arg(call, idx)? {
        RawValue::Text(v) => Ok(v.clone()),
        other => Err(LedgerError::Malformed(format!(
            "{}: argument {idx} must be text, got {}",
            call.method,
            other.kind()
        ))),
    }
}

fn arg_account(call: &ContractCall, idx: usize) -> Result<AccountId, LedgerError> {
    let text = arg_text(call, idx)?;
    AccountId::new(text).map_err(|e| LedgerError::Malformed(format!("{}: {e}", call.method)))
}

fn arg_text_list(call: &ContractCall, idx: usize) -> Result<Vec<String>, LedgerError> {
    match arg(call, idx)? {
        RawValue::List(items) => items
            .iter()
            .map(|item| match item {
                RawValue::Text(t) => Ok(t.clone()),
                other => Err(LedgerError::Malformed(format!(
                    "{}: argument {idx} must contain text, got {}",
                    call.method,
                    other.kind()
                ))),
            })
            .collect(),
        other => Err(LedgerError::Malformed(format!(
            "{}: argument {idx} must be a list, got {}",
            call.method,
            other.kind()
        ))),
    }
}

fn texts(items: &[String]) -> RawValue {
    RawValue::List(items.iter().cloned().map(RawValue::Text).collect())
}

fn status_value(status: RequestStatus) -> RawValue {
    RawValue::Int(U256::from(status.code()))
}

fn decide(status: RequestStatus, decision: Decision) -> Result<RequestStatus, Revert> {
    status
        .transition(decision)
        .map_err(|e| Revert::InvalidState(e.to_string()))
}

impl ParcelEntry {
    fn to_raw(&self) -> RawValue {
        let mut r = RawRecord::new();
        r.insert("id".into(), RawValue::Int(self.id));
        r.insert("owner".into(), RawValue::from(&self.owner));
        r.insert("area".into(), RawValue::Int(self.area));
        r.insert("location".into(), RawValue::Text(self.location.clone()));
        r.insert("propertyId".into(), RawValue::Text(self.property_id.clone()));
        r.insert("surveyNumber".into(), RawValue::Text(self.survey_number.clone()));
        r.insert("price".into(), RawValue::Int(self.price));
        r.insert("documents".into(), texts(&self.documents));
        r.insert("registeredAt".into(), RawValue::Int(self.registered_at));
        r.insert("forSale".into(), RawValue::Bool(self.for_sale));
        RawValue::Record(r)
    }
}

impl RegistrationEntry {
    fn to_raw(&self) -> RawValue {
        let mut r = RawRecord::new();
        r.insert("id".into(), RawValue::Int(self.id));
        r.insert("submitter".into(), RawValue::from(&self.submitter));
        r.insert("area".into(), RawValue::Int(self.area));
        r.insert("location".into(), RawValue::Text(self.location.clone()));
        r.insert("propertyId".into(), RawValue::Text(self.property_id.clone()));
        r.insert("surveyNumber".into(), RawValue::Text(self.survey_number.clone()));
        r.insert("price".into(), RawValue::Int(self.price));
        r.insert("documents".into(), texts(&self.documents));
        r.insert("submittedAt".into(), RawValue::Int(self.submitted_at));
        r.insert("status".into(), status_value(self.status));
        RawValue::Record(r)
    }
}

impl SaleEntry {
    fn to_raw(&self) -> RawValue {
        let mut r = RawRecord::new();
        r.insert("id".into(), RawValue::Int(self.id));
        r.insert("parcelId".into(), RawValue::Int(self.parcel_id));
        r.insert("seller".into(), RawValue::from(&self.seller));
        r.insert("requestedAt".into(), RawValue::Int(self.requested_at));
        r.insert("status".into(), status_value(self.status));
        RawValue::Record(r)
    }
}

impl PurchaseEntry {
    fn to_raw(&self) -> RawValue {
        let mut r = RawRecord::new();
        r.insert("id".into(), RawValue::Int(self.id));
        r.insert("parcelId".into(), RawValue::Int(self.parcel_id));
        r.insert("buyer".into(), RawValue::from(&self.buyer));
        r.insert("seller".into(), RawValue::from(&self.seller));
        r.insert("requestedAt".into(), RawValue::Int(self.requested_at));
        r.insert("status".into(), status_value(self.status));
        RawValue::Record(r)
    }
}

impl LedgerState {
    fn next_parcel_id(&mut self) -> U256 {
        self.next_parcel_id += 1;
        U256::from(self.next_parcel_id)
    }

    fn next_request_id(&mut self) -> U256 {
        self.next_request_id += 1;
        U256::from(self.next_request_id)
    }

    fn parcel_mut(&mut self, id: U256) -> Result<&mut ParcelEntry, Revert> {
        self.parcels
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Revert::NotFound)
    }

    fn register_parcel(
        &mut self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<RawValue, LedgerError> {
        let area = arg_int(call, 0)?;
        let location = arg_text(call, 1)?;
        let property_id = arg_text(call, 2)?;
        let survey_number = arg_text(call, 3)?;
        let price = arg_int(call, 4)?;
        let documents = arg_text_list(call, 5)?;
        let submitted_at = arg_int(call, 6)?;

        if area.is_zero() || documents.is_empty() || property_id.trim().is_empty() {
            return Err(Revert::Other("incomplete parcel submission".to_string()).into());
        }

        let duplicate = self.registrations.iter().any(|r| {
            r.submitter == *signer
                && r.property_id == property_id
                && r.status != RequestStatus::Rejected
        });
        if duplicate {
            return Err(Revert::InvalidState(format!(
                "property '{property_id}' already submitted by this account"
            ))
            .into());
        }

        let id = self.next_request_id();
        self.registrations.push(RegistrationEntry {
            id,
            submitter: signer.clone(),
            area,
            location,
            property_id,
            survey_number,
            price,
            documents,
            submitted_at,
            status: RequestStatus::Pending,
        });
        Ok(RawValue::Int(id))
    }

    fn decide_registration(
        &mut self,
        call: &ContractCall,
        decision: Decision,
    ) -> Result<Option<RawValue>, LedgerError> {
        let id = arg_int(call, 0)?;
        let idx = self
            .registrations
            .iter()
            .position(|r| r.id == id)
            .ok_or(Revert::NotFound)?;
        let next = decide(self.registrations[idx].status, decision)?;
        self.registrations[idx].status = next;

        if decision == Decision::Reject {
            return Ok(None);
        }

        let req = self.registrations[idx].clone();
        let parcel_id = self.next_parcel_id();
        self.parcels.push(ParcelEntry {
            id: parcel_id,
            owner: req.submitter,
            area: req.area,
            location: req.location,
            property_id: req.property_id,
            survey_number: req.survey_number,
            price: req.price,
            documents: req.documents,
            registered_at: now_millis(),
            for_sale: false,
        });
        Ok(Some(RawValue::Int(parcel_id)))
    }

    fn request_sale(
        &mut self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<RawValue, LedgerError> {
        let owner = arg_account(call, 0)?;
        let parcel_id = arg_int(call, 1)?;

        let parcel = self.parcel_mut(parcel_id)?;
        if parcel.owner != owner || parcel.owner != *signer {
            return Err(Revert::NotOwner.into());
        }
        if parcel.for_sale {
            return Err(Revert::InvalidState("parcel is already listed for sale".to_string()).into());
        }
        let pending = self
            .sales
            .iter()
            .any(|s| s.parcel_id == parcel_id && s.status == RequestStatus::Pending);
        if pending {
            return Err(Revert::InvalidState(
                "a sale request for this parcel is already pending".to_string(),
            )
            .into());
        }

        let id = self.next_request_id();
        self.sales.push(SaleEntry {
            id,
            parcel_id,
            seller: owner,
            requested_at: now_millis(),
            status: RequestStatus::Pending,
        });
        Ok(RawValue::Int(id))
    }

    fn decide_sale(&mut self, call: &ContractCall, decision: Decision) -> Result<(), LedgerError> {
        let id = arg_int(call, 0)?;
        let idx = self
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or(Revert::NotFound)?;
        let next = decide(self.sales[idx].status, decision)?;

        if decision == Decision::Accept {
            let seller = self.sales[idx].seller.clone();
            let parcel_id = self.sales[idx].parcel_id;
            let parcel = self.parcel_mut(parcel_id)?;
            if parcel.owner != seller {
                return Err(Revert::NotOwner.into());
            }
            parcel.for_sale = true;
        }
        self.sales[idx].status = next;
        Ok(())
    }

    fn request_purchase(
        &mut self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<RawValue, LedgerError> {
        let buyer = arg_account(call, 0)?;
        let parcel_id = arg_int(call, 1)?;
        if buyer != *signer {
            return Err(Revert::Unauthorized.into());
        }

        let parcel = self.parcel_mut(parcel_id)?;
        if !parcel.for_sale {
            return Err(Revert::NotForSale.into());
        }
        if parcel.owner == buyer {
            return Err(Revert::InvalidState("buyer already owns this parcel".to_string()).into());
        }
        let seller = parcel.owner.clone();

        let duplicate = self.purchases.iter().any(|p| {
            p.parcel_id == parcel_id && p.buyer == buyer && p.status == RequestStatus::Pending
        });
        if duplicate {
            return Err(Revert::InvalidState(
                "a purchase request by this buyer is already pending".to_string(),
            )
            .into());
        }

        let id = self.next_request_id();
        self.purchases.push(PurchaseEntry {
            id,
            parcel_id,
            buyer,
            seller,
            requested_at: now_millis(),
            status: RequestStatus::Pending,
        });
        Ok(RawValue::Int(id))
    }

    fn decide_purchase(
        &mut self,
        call: &ContractCall,
        decision: Decision,
    ) -> Result<(), LedgerError> {
        let id = arg_int(call, 0)?;
        let idx = self
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or(Revert::NotFound)?;
        let next = decide(self.purchases[idx].status, decision)?;

        if decision == Decision::Accept {
            let req = self.purchases[idx].clone();
            let parcel = self.parcel_mut(req.parcel_id)?;
            // Ownership moved or listing withdrawn since the request was made.
            if !parcel.for_sale || parcel.owner != req.seller {
                return Err(Revert::AlreadySold.into());
            }
            parcel.owner = req.buyer;
            parcel.for_sale = false;
        }
        self.purchases[idx].status = next;
        Ok(())
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose contract recognises `administrators` as registry admins.
    pub fn with_administrators(administrators: impl IntoIterator<Item = AccountId>) -> Self {
        let ledger = Self::new();
        if let Ok(mut settings) = ledger.settings.write() {
            settings.administrators.extend(administrators);
        }
        ledger
    }

    /// Simulate a network partition: every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut settings) = self.settings.write() {
            settings.offline = offline;
        }
    }

    /// Delay applied before every call is processed.
    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut settings) = self.settings.write() {
            settings.latency = latency;
        }
    }

    /// Number of committed transactions so far.
    pub fn block_number(&self) -> u64 {
        self.state.read().map(|s| s.block_number).unwrap_or(0)
    }

    /// Place a parcel directly in ledger state; returns its id.
    pub fn insert_parcel(&self, seed: ParcelSeed) -> Result<U256, LedgerError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let id = state.next_parcel_id();
        state.parcels.push(ParcelEntry {
            id,
            owner: seed.owner,
            area: seed.area,
            location: seed.location,
            property_id: seed.property_id,
            survey_number: seed.survey_number,
            price: seed.price,
            documents: seed.documents,
            registered_at: seed.registered_at,
            for_sale: seed.for_sale,
        });
        Ok(id)
    }

    async fn admit(&self) -> Result<(), LedgerError> {
        let (offline, latency) = {
            let settings = self.settings.read().map_err(|_| poisoned())?;
            (settings.offline, settings.latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if offline {
            return Err(LedgerError::Unavailable("ledger node unreachable".to_string()));
        }
        Ok(())
    }

    fn is_administrator(&self, account: &AccountId) -> Result<bool, LedgerError> {
        let settings = self.settings.read().map_err(|_| poisoned())?;
        Ok(settings.administrators.contains(account))
    }

    fn execute(
        &self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<TransactionReceipt, LedgerError> {
        let admin_only = matches!(
            call.method,
            methods::ACCEPT_REGISTRATION
                | methods::REJECT_REGISTRATION
                | methods::ACCEPT_SALE
                | methods::REJECT_SALE
                | methods::ACCEPT_PURCHASE
                | methods::REJECT_PURCHASE
        );
        if admin_only && !self.is_administrator(signer)? {
            return Err(Revert::Unauthorized.into());
        }

        let mut state = self.state.write().map_err(|_| poisoned())?;
        let output = match call.method {
            methods::REGISTER_PARCEL => Some(state.register_parcel(call, signer)?),
            methods::ACCEPT_REGISTRATION => state.decide_registration(call, Decision::Accept)?,
            methods::REJECT_REGISTRATION => state.decide_registration(call, Decision::Reject)?,
            methods::REQUEST_SALE => Some(state.request_sale(call, signer)?),
            methods::ACCEPT_SALE => {
                state.decide_sale(call, Decision::Accept)?;
                None
            }
            methods::REJECT_SALE => {
                state.decide_sale(call, Decision::Reject)?;
                None
            }
            methods::REQUEST_PURCHASE => Some(state.request_purchase(call, signer)?),
            methods::ACCEPT_PURCHASE => {
                state.decide_purchase(call, Decision::Accept)?;
                None
            }
            methods::REJECT_PURCHASE => {
                state.decide_purchase(call, Decision::Reject)?;
                None
            }
            other => {
                return Err(Revert::Other(format!("unknown transaction method '{other}'")).into());
            }
        };

        state.block_number += 1;
        Ok(TransactionReceipt {
            transaction_hash: format!("0x{}", Uuid::now_v7().simple()),
            block_number: U256::from(state.block_number),
            status: ReceiptStatus::Committed,
            output,
        })
    }

    fn read(&self, call: &ContractCall) -> Result<RawValue, LedgerError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let rows: Vec<RawValue> = match call.method {
            methods::ALL_PARCELS => state.parcels.iter().map(ParcelEntry::to_raw).collect(),
            methods::OWNED_PARCELS => {
                let owner = arg_account(call, 0)?;
                state
                    .parcels
                    .iter()
                    .filter(|p| p.owner == owner)
                    .map(ParcelEntry::to_raw)
                    .collect()
            }
            methods::REGISTRATION_REQUESTS => state
                .registrations
                .iter()
                .map(RegistrationEntry::to_raw)
                .collect(),
            methods::SALE_REQUESTS => state.sales.iter().map(SaleEntry::to_raw).collect(),
            methods::PURCHASE_REQUESTS => {
                state.purchases.iter().map(PurchaseEntry::to_raw).collect()
            }
            other => {
                return Err(Revert::Other(format!("unknown query method '{other}'")).into());
            }
        };
        Ok(RawValue::List(rows))
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn submit_transaction(
        &self,
        call: &ContractCall,
        signer: &AccountId,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.admit().await?;
        self.execute(call, signer)
    }

    async fn query(&self, call: &ContractCall) -> Result<RawValue, LedgerError> {
        self.admit().await?;
        self.read(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn register_call() -> ContractCall {
        ContractCall::new(methods::REGISTER_PARCEL)
            .arg(100u64)
            .arg("Kerala, Ernakulam")
            .arg("P1")
            .arg("S-1")
            .arg(5000u64)
            .arg(vec!["deed.pdf".to_string()])
            .arg(1u64)
    }

    fn rows(value: RawValue) -> Vec<RawValue> {
        match value {
            RawValue::List(rows) => rows,
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn registration_accept_creates_parcel_once() {
        let admin = account("0xadmin");
        let ledger = InMemoryLedger::with_administrators([admin.clone()]);
        let owner = account("0xa");

        let receipt = ledger.submit_transaction(&register_call(), &owner).await.unwrap();
        assert!(receipt.is_committed());
        let id = match receipt.output {
            Some(RawValue::Int(id)) => id,
            other => panic!("expected request id, got {other:?}"),
        };

        let accept = ContractCall::new(methods::ACCEPT_REGISTRATION).arg(id);
        ledger.submit_transaction(&accept, &admin).await.unwrap();
        let err = ledger.submit_transaction(&accept, &admin).await.unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(Revert::InvalidState(_))));

        let all = ledger.query(&ContractCall::new(methods::ALL_PARCELS)).await.unwrap();
        assert_eq!(rows(all).len(), 1);
        assert_eq!(ledger.block_number(), 2);
    }

    #[tokio::test]
    async fn only_administrators_decide() {
        let ledger = InMemoryLedger::new();
        let owner = account("0xa");
        ledger.submit_transaction(&register_call(), &owner).await.unwrap();

        let accept = ContractCall::new(methods::ACCEPT_REGISTRATION).arg(1u64);
        let err = ledger.submit_transaction(&accept, &owner).await.unwrap_err();
        assert_eq!(err, LedgerError::Reverted(Revert::Unauthorized));
    }

    #[tokio::test]
    async fn duplicate_property_submission_is_refused() {
        let ledger = InMemoryLedger::new();
        let owner = account("0xa");
        ledger.submit_transaction(&register_call(), &owner).await.unwrap();
        let err = ledger
            .submit_transaction(&register_call(), &owner)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(Revert::InvalidState(_))));

        // A different account may use the same property id.
        ledger
            .submit_transaction(&register_call(), &account("0xb"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn offline_ledger_is_unavailable() {
        let ledger = InMemoryLedger::new();
        ledger.set_offline(true);
        let err = ledger
            .query(&ContractCall::new(methods::ALL_PARCELS))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn purchase_requires_listing() {
        let ledger = InMemoryLedger::new();
        let owner = account("0xa");
        let id = ledger
            .insert_parcel(ParcelSeed {
                owner: owner.clone(),
                area: U256::from(10u64),
                location: "x, y".to_string(),
                property_id: "P".to_string(),
                survey_number: "S".to_string(),
                price: U256::zero(),
                documents: vec!["d".to_string()],
                registered_at: U256::one(),
                for_sale: false,
            })
            .unwrap();

        let buyer = account("0xb");
        let call = ContractCall::new(methods::REQUEST_PURCHASE).arg(&buyer).arg(id);
        let err = ledger.submit_transaction(&call, &buyer).await.unwrap_err();
        assert_eq!(err, LedgerError::Reverted(Revert::NotForSale));
    }
}
