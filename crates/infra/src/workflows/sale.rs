use tracing::instrument;

use landreg_auth::{authorize, ensure_acting_as, Permission};
use landreg_core::{AccountId, ParcelId, RequestId};
use landreg_land::SaleRequest;

use super::{decide, issued_request_id, queue};
use crate::client::{CallContext, LedgerClient};
use crate::error::WorkflowError;
use crate::ledger::{methods, ContractCall, LedgerGateway};
use crate::normalize::Normalized;

/// Owners asking to list a parcel; administrators approving the listing.
#[derive(Debug, Clone)]
pub struct SaleWorkflow<G> {
    client: LedgerClient<G>,
}

impl<G> SaleWorkflow<G>
where
    G: LedgerGateway,
{
    pub fn new(client: LedgerClient<G>) -> Self {
        Self { client }
    }

    /// Ask to list `parcel_id` for sale.
    ///
    /// `owner` must be the caller. Ownership itself is checked by the ledger
    /// only, which answers `NotOwner`.
    #[instrument(
        skip(self, ctx),
        fields(actor = %ctx.actor.account, owner = %owner, parcel_id = %parcel_id),
        err
    )]
    pub async fn request_sale(
        &self,
        ctx: &CallContext,
        owner: &AccountId,
        parcel_id: ParcelId,
    ) -> Result<RequestId, WorkflowError> {
        authorize(&ctx.actor, &Permission::SALE_REQUEST)?;
        ensure_acting_as(&ctx.actor, owner)?;

        let call = ContractCall::new(methods::REQUEST_SALE)
            .arg(owner)
            .arg(parcel_id);
        let receipt = self.client.submit(ctx, call).await?;
        let id = issued_request_id("sale_request", &receipt)?;

        tracing::info!(request_id = %id, "sale requested");
        Ok(id)
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account), err)]
    pub async fn list_pending(
        &self,
        ctx: &CallContext,
    ) -> Result<Normalized<Vec<SaleRequest>>, WorkflowError> {
        let all: Normalized<Vec<SaleRequest>> =
            queue(&self.client, ctx, &Permission::SALE_DECIDE, methods::SALE_REQUESTS).await?;
        Ok(all.map(|requests| requests.into_iter().filter(|r| r.is_pending()).collect()))
    }

    /// Approve the listing; the parcel becomes `for_sale`.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, request_id = %id), err)]
    pub async fn accept(&self, ctx: &CallContext, id: RequestId) -> Result<(), WorkflowError> {
        decide(&self.client, ctx, &Permission::SALE_DECIDE, methods::ACCEPT_SALE, id).await?;
        tracing::info!(request_id = %id, "sale accepted; parcel listed");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, request_id = %id), err)]
    pub async fn reject(&self, ctx: &CallContext, id: RequestId) -> Result<(), WorkflowError> {
        decide(&self.client, ctx, &Permission::SALE_DECIDE, methods::REJECT_SALE, id).await?;
        tracing::info!(request_id = %id, "sale rejected");
        Ok(())
    }
}
