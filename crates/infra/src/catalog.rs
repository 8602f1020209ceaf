//! Read-only parcel views. Every read goes to the ledger; nothing is cached.

use tracing::instrument;

use landreg_auth::{authorize, Permission};
use landreg_core::{AccountId, Entity, ParcelId};
use landreg_land::Parcel;

use crate::client::{CallContext, LedgerClient};
use crate::error::WorkflowError;
use crate::ledger::{methods, ContractCall, LedgerGateway};
use crate::normalize::{normalize_list, Normalized};

#[derive(Debug, Clone)]
pub struct ParcelCatalog<G> {
    client: LedgerClient<G>,
}

impl<G> ParcelCatalog<G>
where
    G: LedgerGateway,
{
    pub fn new(client: LedgerClient<G>) -> Self {
        Self { client }
    }

    /// Parcels currently owned by `owner`, in ledger order.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, owner = %owner), err)]
    pub async fn list_owned(
        &self,
        ctx: &CallContext,
        owner: &AccountId,
    ) -> Result<Normalized<Vec<Parcel>>, WorkflowError> {
        authorize(&ctx.actor, &Permission::PARCELS_READ)?;
        let call = ContractCall::new(methods::OWNED_PARCELS).arg(owner);
        self.read(ctx, call).await
    }

    /// Every registered parcel, in ledger order.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account), err)]
    pub async fn list_all(
        &self,
        ctx: &CallContext,
    ) -> Result<Normalized<Vec<Parcel>>, WorkflowError> {
        authorize(&ctx.actor, &Permission::PARCELS_READ)?;
        self.read(ctx, ContractCall::new(methods::ALL_PARCELS)).await
    }

    /// One parcel by id. Warnings raised while decoding the ledger listing
    /// are kept, as for the list views.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, parcel_id = %parcel_id), err)]
    pub async fn find(
        &self,
        ctx: &CallContext,
        parcel_id: ParcelId,
    ) -> Result<Normalized<Option<Parcel>>, WorkflowError> {
        authorize(&ctx.actor, &Permission::PARCELS_READ)?;
        self.lookup(ctx, parcel_id).await
    }

    /// Lookup without a permission check, for advisory checks inside other operations.
    pub(crate) async fn lookup(
        &self,
        ctx: &CallContext,
        parcel_id: ParcelId,
    ) -> Result<Normalized<Option<Parcel>>, WorkflowError> {
        let parcels = self
            .read(ctx, ContractCall::new(methods::ALL_PARCELS))
            .await?;
        Ok(parcels.map(|all| all.into_iter().find(|p| *p.id() == parcel_id)))
    }

    async fn read(
        &self,
        ctx: &CallContext,
        call: ContractCall,
    ) -> Result<Normalized<Vec<Parcel>>, WorkflowError> {
        let raw = self.client.query(ctx, call).await?;
        Ok(normalize_list::<Parcel>(&raw)?)
    }
}
