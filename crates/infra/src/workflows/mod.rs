//! Request workflows: parcel registration, sale listing and purchase.
//!
//! Each request follows `Pending -> Accepted | Rejected`. The ledger enforces
//! the transition atomically; workflows check roles before dispatch and never
//! retry a rejected or timed-out transaction.

pub mod purchase;
pub mod registration;
pub mod sale;

pub use purchase::PurchaseWorkflow;
pub use registration::RegistrationWorkflow;
pub use sale::SaleWorkflow;

use landreg_auth::{authorize, Permission};
use landreg_core::RequestId;

use crate::client::{CallContext, LedgerClient};
use crate::error::WorkflowError;
use crate::ledger::{ContractCall, LedgerGateway, TransactionReceipt};
use crate::normalize::{normalize_list, normalize_output, LedgerRecord, Normalized};

/// Id the ledger assigned to a newly created request.
fn issued_request_id(
    record: &'static str,
    receipt: &TransactionReceipt,
) -> Result<RequestId, WorkflowError> {
    let id = normalize_output(record, receipt.output.as_ref())?;
    Ok(RequestId::new(id.into_inner()))
}

/// Admin decision on one request, checked locally before it is dispatched.
async fn decide<G: LedgerGateway>(
    client: &LedgerClient<G>,
    ctx: &CallContext,
    permission: &Permission,
    method: &'static str,
    id: RequestId,
) -> Result<TransactionReceipt, WorkflowError> {
    authorize(&ctx.actor, permission)?;
    client.submit(ctx, ContractCall::new(method).arg(id)).await
}

/// Full request queue of one kind, in ledger order.
async fn queue<G, T>(
    client: &LedgerClient<G>,
    ctx: &CallContext,
    permission: &Permission,
    method: &'static str,
) -> Result<Normalized<Vec<T>>, WorkflowError>
where
    G: LedgerGateway,
    T: LedgerRecord,
{
    authorize(&ctx.actor, permission)?;
    let raw = client.query(ctx, ContractCall::new(method)).await?;
    Ok(normalize_list::<T>(&raw)?)
}
