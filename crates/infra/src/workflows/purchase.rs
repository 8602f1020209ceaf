use tracing::instrument;

use landreg_auth::{authorize, ensure_acting_as, Permission};
use landreg_core::{AccountId, ParcelId, RequestId};
use landreg_land::PurchaseRequest;

use super::{decide, issued_request_id, queue};
use crate::catalog::ParcelCatalog;
use crate::client::{CallContext, LedgerClient};
use crate::error::WorkflowError;
use crate::ledger::{methods, ContractCall, LedgerGateway};
use crate::normalize::Normalized;

/// Buyers asking to acquire listed parcels; administrators settling the transfer.
#[derive(Debug, Clone)]
pub struct PurchaseWorkflow<G> {
    client: LedgerClient<G>,
    catalog: ParcelCatalog<G>,
    precheck: bool,
}

impl<G> PurchaseWorkflow<G>
where
    G: LedgerGateway + Clone,
{
    /// `precheck` enables the advisory listing check before submission.
    pub fn new(client: LedgerClient<G>, precheck: bool) -> Self {
        let catalog = ParcelCatalog::new(client.clone());
        Self {
            client,
            catalog,
            precheck,
        }
    }
}

impl<G> PurchaseWorkflow<G>
where
    G: LedgerGateway,
{
    /// Ask to buy `parcel_id`. `buyer` must be the caller.
    ///
    /// The precheck only fails fast; the ledger applies the same rule again
    /// atomically, so a listing withdrawn in between still yields `NotForSale`.
    #[instrument(
        skip(self, ctx),
        fields(actor = %ctx.actor.account, buyer = %buyer, parcel_id = %parcel_id),
        err
    )]
    pub async fn request_purchase(
        &self,
        ctx: &CallContext,
        buyer: &AccountId,
        parcel_id: ParcelId,
    ) -> Result<RequestId, WorkflowError> {
        authorize(&ctx.actor, &Permission::PURCHASE_REQUEST)?;
        ensure_acting_as(&ctx.actor, buyer)?;

        // Precheck and submission share the caller's deadline.
        let id = self
            .client
            .within(ctx, async {
                if self.precheck {
                    match self.catalog.lookup(ctx, parcel_id).await?.value {
                        None => {
                            return Err(WorkflowError::NotFound(format!("parcel {parcel_id}")));
                        }
                        Some(parcel) if !parcel.for_sale => return Err(WorkflowError::NotForSale),
                        Some(_) => {}
                    }
                }

                let call = ContractCall::new(methods::REQUEST_PURCHASE)
                    .arg(buyer)
                    .arg(parcel_id);
                let receipt = self.client.submit(ctx, call).await?;
                issued_request_id("purchase_request", &receipt)
            })
            .await?;

        tracing::info!(request_id = %id, "purchase requested");
        Ok(id)
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account), err)]
    pub async fn list_pending(
        &self,
        ctx: &CallContext,
    ) -> Result<Normalized<Vec<PurchaseRequest>>, WorkflowError> {
        let all: Normalized<Vec<PurchaseRequest>> = queue(
            &self.client,
            ctx,
            &Permission::PURCHASE_DECIDE,
            methods::PURCHASE_REQUESTS,
        )
        .await?;
        Ok(all.map(|requests| requests.into_iter().filter(|r| r.is_pending()).collect()))
    }

    /// Transfer the parcel to the buyer and take it off the market.
    ///
    /// One ledger transaction; when two requests for the same parcel are
    /// accepted concurrently, the later one fails with `AlreadySold`.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, request_id = %id), err)]
    pub async fn accept(&self, ctx: &CallContext, id: RequestId) -> Result<(), WorkflowError> {
        let receipt = decide(
            &self.client,
            ctx,
            &Permission::PURCHASE_DECIDE,
            methods::ACCEPT_PURCHASE,
            id,
        )
        .await?;
        tracing::info!(
            request_id = %id,
            tx = %receipt.transaction_hash,
            "purchase accepted; ownership transferred"
        );
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, request_id = %id), err)]
    pub async fn reject(&self, ctx: &CallContext, id: RequestId) -> Result<(), WorkflowError> {
        decide(
            &self.client,
            ctx,
            &Permission::PURCHASE_DECIDE,
            methods::REJECT_PURCHASE,
            id,
        )
        .await?;
        tracing::info!(request_id = %id, "purchase rejected");
        Ok(())
    }
}
