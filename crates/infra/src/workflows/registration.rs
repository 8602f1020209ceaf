use chrono::Utc;
use tracing::instrument;

use landreg_auth::{authorize, Permission};
use landreg_core::{ParcelId, RequestId};
use landreg_land::{ParcelDraft, RegistrationRequest};

use super::{decide, issued_request_id, queue};
use crate::client::{CallContext, LedgerClient};
use crate::error::WorkflowError;
use crate::ledger::{methods, ContractCall, LedgerGateway};
use crate::normalize::{normalize_output, Normalized};

/// Submission and admin review of new parcels.
#[derive(Debug, Clone)]
pub struct RegistrationWorkflow<G> {
    client: LedgerClient<G>,
}

impl<G> RegistrationWorkflow<G>
where
    G: LedgerGateway,
{
    pub fn new(client: LedgerClient<G>) -> Self {
        Self { client }
    }

    /// Validate a draft and submit it for registration, signed by the caller.
    ///
    /// An invalid draft never reaches the ledger.
    #[instrument(
        skip(self, ctx, draft),
        fields(actor = %ctx.actor.account, property_id = %draft.property_id),
        err
    )]
    pub async fn submit(
        &self,
        ctx: &CallContext,
        draft: &ParcelDraft,
    ) -> Result<RequestId, WorkflowError> {
        authorize(&ctx.actor, &Permission::REGISTRATION_SUBMIT)?;
        let draft = draft.validate()?;
        let submitted_at = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);

        let call = ContractCall::new(methods::REGISTER_PARCEL)
            .arg(draft.area)
            .arg(draft.location)
            .arg(draft.property_id)
            .arg(draft.survey_number)
            .arg(draft.price)
            .arg(draft.document_refs)
            .arg(submitted_at);
        let receipt = self.client.submit(ctx, call).await?;
        let id = issued_request_id("registration_request", &receipt)?;

        tracing::info!(request_id = %id, tx = %receipt.transaction_hash, "registration submitted");
        Ok(id)
    }

    /// Registration requests still awaiting a decision.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account), err)]
    pub async fn list_pending(
        &self,
        ctx: &CallContext,
    ) -> Result<Normalized<Vec<RegistrationRequest>>, WorkflowError> {
        let all = self.list_requests(ctx).await?;
        Ok(all.map(|requests| requests.into_iter().filter(|r| r.is_pending()).collect()))
    }

    /// Every registration request, decided or not.
    pub async fn list_requests(
        &self,
        ctx: &CallContext,
    ) -> Result<Normalized<Vec<RegistrationRequest>>, WorkflowError> {
        queue(
            &self.client,
            ctx,
            &Permission::REGISTRATION_DECIDE,
            methods::REGISTRATION_REQUESTS,
        )
        .await
    }

    /// Accept a pending registration; returns the id of the new parcel.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, request_id = %id), err)]
    pub async fn accept(
        &self,
        ctx: &CallContext,
        id: RequestId,
    ) -> Result<ParcelId, WorkflowError> {
        let receipt = decide(
            &self.client,
            ctx,
            &Permission::REGISTRATION_DECIDE,
            methods::ACCEPT_REGISTRATION,
            id,
        )
        .await?;
        let parcel_id = ParcelId::new(normalize_output("parcel", receipt.output.as_ref())?.into_inner());

        tracing::info!(request_id = %id, parcel_id = %parcel_id, "registration accepted");
        Ok(parcel_id)
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor.account, request_id = %id), err)]
    pub async fn reject(&self, ctx: &CallContext, id: RequestId) -> Result<(), WorkflowError> {
        decide(
            &self.client,
            ctx,
            &Permission::REGISTRATION_DECIDE,
            methods::REJECT_REGISTRATION,
            id,
        )
        .await?;
        tracing::info!(request_id = %id, "registration rejected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::ledger::InMemoryLedger;
    use landreg_auth::Actor;
    use landreg_core::{AccountId, RequestStatus};

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn draft() -> ParcelDraft {
        ParcelDraft {
            area: 250,
            state: "Kerala".to_string(),
            district: "Kollam".to_string(),
            property_id: "KL-07".to_string(),
            survey_number: "112/4".to_string(),
            price: 0,
            document_refs: vec!["deed.pdf".to_string(), "tax.pdf".to_string()],
        }
    }

    fn setup() -> (Arc<InMemoryLedger>, RegistrationWorkflow<Arc<InMemoryLedger>>, CallContext) {
        let admin = account("0xadmin");
        let ledger = Arc::new(InMemoryLedger::with_administrators([admin.clone()]));
        let workflow =
            RegistrationWorkflow::new(LedgerClient::new(ledger.clone(), Duration::from_secs(5)));
        (ledger, workflow, CallContext::new(Actor::administrator(admin)))
    }

    #[tokio::test]
    async fn submitted_request_is_pending_with_composite_location() {
        let (_, workflow, admin) = setup();
        let owner = CallContext::new(Actor::landholder(account("0xa")));

        let id = workflow.submit(&owner, &draft()).await.unwrap();
        let pending = workflow.list_pending(&admin).await.unwrap().value;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
        assert_eq!(pending[0].location, "Kerala, Kollam");
        assert_eq!(pending[0].submitter, account("0xa"));
        assert_eq!(pending[0].status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn rejected_request_leaves_the_pending_queue() {
        let (_, workflow, admin) = setup();
        let owner = CallContext::new(Actor::landholder(account("0xa")));
        let id = workflow.submit(&owner, &draft()).await.unwrap();

        workflow.reject(&admin, id).await.unwrap();
        assert!(workflow.list_pending(&admin).await.unwrap().value.is_empty());

        let all = workflow.list_requests(&admin).await.unwrap().value;
        assert_eq!(all[0].status, RequestStatus::Rejected);

        let err = workflow.accept(&admin, id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn invalid_draft_is_refused_before_dispatch() {
        let (ledger, workflow, _) = setup();
        let owner = CallContext::new(Actor::landholder(account("0xa")));
        let mut bad = draft();
        bad.document_refs.clear();

        let err = workflow.submit(&owner, &bad).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(ledger.block_number(), 0);
    }

    #[tokio::test]
    async fn landholder_cannot_see_the_review_queue() {
        let (_, workflow, _) = setup();
        let owner = CallContext::new(Actor::landholder(account("0xa")));
        let err = workflow.list_pending(&owner).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Unauthorized(_)));
    }
}
