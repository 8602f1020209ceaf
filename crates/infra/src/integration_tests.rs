//! End-to-end tests over the in-memory ledger.
//!
//! Tests: draft → registration → listing → purchase → catalog
//!
//! Verifies:
//! - The full parcel lifecycle leaves the catalog in the expected state
//! - Terminal requests cannot be decided twice
//! - Racing purchase acceptances transfer a parcel exactly once
//! - Deadlines, outages and oversized ledger values surface as documented

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use landreg_auth::Actor;
    use landreg_core::{AccountId, LedgerNumber, ParcelId, RequestId, U256};
    use landreg_land::ParcelDraft;

    use crate::client::CallContext;
    use crate::config::EngineConfig;
    use crate::error::{FailureKind, WorkflowError};
    use crate::ledger::{InMemoryLedger, ParcelSeed};
    use crate::outcome::OperationResult;
    use crate::registry::LandRegistry;

    type Registry = LandRegistry<Arc<InMemoryLedger>>;

    struct World {
        ledger: Arc<InMemoryLedger>,
        registry: Registry,
        admin: CallContext,
    }

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn holder(s: &str) -> CallContext {
        CallContext::new(Actor::landholder(account(s)))
    }

    fn world(config: EngineConfig) -> World {
        landreg_observability::init_for_tests();
        let admin = account("0xadmin");
        let ledger = Arc::new(InMemoryLedger::with_administrators([admin.clone()]));
        let registry = LandRegistry::new(ledger.clone(), config);
        World {
            ledger,
            registry,
            admin: CallContext::new(Actor::administrator(admin)),
        }
    }

    fn draft(property_id: &str) -> ParcelDraft {
        ParcelDraft {
            area: 100,
            state: "Kerala".to_string(),
            district: "Ernakulam".to_string(),
            property_id: property_id.to_string(),
            survey_number: "S-101".to_string(),
            price: 5000,
            document_refs: vec!["ipfs://deed".to_string()],
        }
    }

    /// Register and approve a parcel owned by `owner`.
    async fn registered(w: &World, owner: &CallContext, property_id: &str) -> ParcelId {
        let request = w
            .registry
            .registration()
            .submit(owner, &draft(property_id))
            .await
            .unwrap();
        w.registry
            .registration()
            .accept(&w.admin, request)
            .await
            .unwrap()
    }

    /// Register, approve and list a parcel owned by `owner`.
    async fn listed(w: &World, owner: &CallContext, property_id: &str) -> ParcelId {
        let parcel = registered(w, owner, property_id).await;
        let sale = w
            .registry
            .sales()
            .request_sale(owner, &owner.actor.account, parcel)
            .await
            .unwrap();
        w.registry.sales().accept(&w.admin, sale).await.unwrap();
        parcel
    }

    async fn request_purchase(w: &World, buyer: &CallContext, parcel: ParcelId) -> RequestId {
        w.registry
            .purchases()
            .request_purchase(buyer, &buyer.actor.account, parcel)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn parcel_lifecycle_from_draft_to_new_owner() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");
        let b = holder("0xb");

        // Submission stays pending until an administrator decides.
        let request = w.registry.registration().submit(&a, &draft("P1")).await.unwrap();
        let pending = w.registry.registration().list_pending(&w.admin).await.unwrap().value;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, request);
        assert!(
            w.registry
                .catalog()
                .list_owned(&a, &a.actor.account)
                .await
                .unwrap()
                .value
                .is_empty()
        );

        let parcel = w.registry.registration().accept(&w.admin, request).await.unwrap();
        let owned = w
            .registry
            .catalog()
            .list_owned(&a, &a.actor.account)
            .await
            .unwrap()
            .value;
        assert_eq!(owned.len(), 1);
        let p = &owned[0];
        assert_eq!(p.id, parcel);
        assert_eq!(p.owner, a.actor.account);
        assert_eq!(p.area, LedgerNumber::Native(100));
        assert_eq!(p.price, LedgerNumber::Native(5000));
        assert_eq!(p.location, "Kerala, Ernakulam");
        assert_eq!(p.property_id, "P1");
        assert_eq!(p.survey_number, "S-101");
        assert_eq!(p.document_refs, vec!["ipfs://deed".to_string()]);
        assert!(!p.for_sale);
        assert!(p.registered_at_utc().is_some());

        // Listing.
        let sale = w
            .registry
            .sales()
            .request_sale(&a, &a.actor.account, parcel)
            .await
            .unwrap();
        assert_eq!(w.registry.sales().list_pending(&w.admin).await.unwrap().value.len(), 1);
        w.registry.sales().accept(&w.admin, sale).await.unwrap();
        let listed = w.registry.catalog().find(&a, parcel).await.unwrap().value.unwrap();
        assert!(listed.for_sale);

        // Two buyers queue up before the administrator settles.
        let c = holder("0xc");
        let from_b = request_purchase(&w, &b, parcel).await;
        let from_c = request_purchase(&w, &c, parcel).await;
        assert_eq!(w.registry.purchases().list_pending(&w.admin).await.unwrap().value.len(), 2);

        w.registry.purchases().accept(&w.admin, from_b).await.unwrap();
        let sold = w.registry.catalog().find(&b, parcel).await.unwrap().value.unwrap();
        assert_eq!(sold.owner, b.actor.account);
        assert!(!sold.for_sale);
        assert!(
            w.registry
                .catalog()
                .list_owned(&a, &a.actor.account)
                .await
                .unwrap()
                .value
                .is_empty()
        );

        let err = w.registry.purchases().accept(&w.admin, from_c).await.unwrap_err();
        assert_eq!(err, WorkflowError::AlreadySold);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acceptance_transfers_exactly_once() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");
        let parcel = listed(&w, &a, "P1").await;

        let b = holder("0xb");
        let c = holder("0xc");
        let from_b = request_purchase(&w, &b, parcel).await;
        let from_c = request_purchase(&w, &c, parcel).await;

        let (r1, r2) = tokio::join!(
            {
                let registry = w.registry.clone();
                let admin = w.admin.clone();
                tokio::spawn(async move { registry.purchases().accept(&admin, from_b).await })
            },
            {
                let registry = w.registry.clone();
                let admin = w.admin.clone();
                tokio::spawn(async move { registry.purchases().accept(&admin, from_c).await })
            },
        );
        let results = [r1.unwrap(), r2.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.contains(&Err(WorkflowError::AlreadySold)));

        let owner = w
            .registry
            .catalog()
            .find(&w.admin, parcel)
            .await
            .unwrap()
            .value
            .unwrap()
            .owner;
        let winner = if results[0].is_ok() { &b } else { &c };
        assert_eq!(owner, winner.actor.account);
    }

    #[tokio::test]
    async fn terminal_requests_cannot_be_decided_again() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");

        let accepted = w.registry.registration().submit(&a, &draft("P1")).await.unwrap();
        w.registry.registration().accept(&w.admin, accepted).await.unwrap();
        for err in [
            w.registry.registration().accept(&w.admin, accepted).await.unwrap_err(),
            w.registry.registration().reject(&w.admin, accepted).await.unwrap_err(),
        ] {
            assert!(matches!(err, WorkflowError::InvalidState(_)));
        }

        let rejected = w.registry.registration().submit(&a, &draft("P2")).await.unwrap();
        w.registry.registration().reject(&w.admin, rejected).await.unwrap();
        let err = w.registry.registration().accept(&w.admin, rejected).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        // Only the accepted submission became a parcel.
        assert_eq!(w.registry.catalog().list_all(&a).await.unwrap().value.len(), 1);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let w = world(EngineConfig::default());
        let err = w
            .registry
            .sales()
            .accept(&w.admin, RequestId::from(404))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[tokio::test]
    async fn unlisted_parcel_cannot_be_bought() {
        let w = world(EngineConfig::default().with_purchase_precheck(false));
        let a = holder("0xa");
        let b = holder("0xb");
        let parcel = registered(&w, &a, "P1").await;

        let before = w.ledger.block_number();
        let err = w
            .registry
            .purchases()
            .request_purchase(&b, &b.actor.account, parcel)
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::NotForSale);
        assert_eq!(w.ledger.block_number(), before);
        assert!(
            w.registry
                .purchases()
                .list_pending(&w.admin)
                .await
                .unwrap()
                .value
                .is_empty()
        );
    }

    #[tokio::test]
    async fn listing_owned_parcels_is_idempotent() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");
        registered(&w, &a, "P1").await;
        registered(&w, &a, "P2").await;

        let first = w.registry.catalog().list_owned(&a, &a.actor.account).await.unwrap();
        let second = w.registry.catalog().list_owned(&a, &a.actor.account).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value.len(), 2);
    }

    #[tokio::test]
    async fn invalid_drafts_never_reach_the_ledger() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");

        let mut negative_price = draft("P1");
        negative_price.price = -1;
        let mut zero_area = draft("P2");
        zero_area.area = 0;
        let mut blank_property = draft("P3");
        blank_property.property_id = "  ".to_string();

        for bad in [negative_price, zero_area, blank_property] {
            let err = w.registry.registration().submit(&a, &bad).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Validation);
        }
        assert_eq!(w.ledger.block_number(), 0);
    }

    #[tokio::test]
    async fn duplicate_submission_of_one_property_is_refused() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");
        w.registry.registration().submit(&a, &draft("P1")).await.unwrap();
        let err = w.registry.registration().submit(&a, &draft("P1")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[tokio::test]
    async fn non_administrators_are_refused_before_dispatch() {
        let w = world(EngineConfig::default());
        let a = holder("0xa");
        let request = w.registry.registration().submit(&a, &draft("P1")).await.unwrap();

        let before = w.ledger.block_number();
        let err = w.registry.registration().accept(&a, request).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unauthorized);
        assert_eq!(w.ledger.block_number(), before);
    }

    #[tokio::test]
    async fn deadline_shorter_than_ledger_latency_times_out() {
        let w = world(EngineConfig::default());
        w.ledger.set_latency(Duration::from_millis(200));

        let ctx = holder("0xa").with_deadline(Duration::from_millis(10));
        let err = w.registry.catalog().list_all(&ctx).await.unwrap_err();
        assert_eq!(err, WorkflowError::LedgerTimeout(Duration::from_millis(10)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn engine_timeout_applies_without_caller_deadline() {
        let w = world(EngineConfig::default().with_ledger_timeout(Duration::from_millis(10)));
        w.ledger.set_latency(Duration::from_millis(200));

        let a = holder("0xa");
        let err = w.registry.registration().submit(&a, &draft("P1")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::LedgerTimeout);
    }

    #[tokio::test]
    async fn offline_ledger_is_unavailable() {
        let w = world(EngineConfig::default());
        w.ledger.set_offline(true);

        let a = holder("0xa");
        let result =
            OperationResult::from_normalized(w.registry.catalog().list_owned(&a, &a.actor.account).await);
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::LedgerUnavailable));
        assert_eq!(result.status_code(), 503);
    }

    #[tokio::test]
    async fn oversized_ledger_values_pass_through_with_warning() {
        let w = world(EngineConfig::default());
        let owner = account("0xa");
        let huge = U256::from(u64::MAX) + U256::one();
        w.ledger
            .insert_parcel(ParcelSeed {
                owner: owner.clone(),
                area: huge,
                location: "Rajasthan, Jaisalmer".to_string(),
                property_id: "RJ-1".to_string(),
                survey_number: "1".to_string(),
                price: U256::from(10u64),
                documents: vec!["deed.pdf".to_string()],
                registered_at: U256::one(),
                for_sale: false,
            })
            .unwrap();

        let ctx = holder("0xa");
        let listed = w.registry.catalog().list_owned(&ctx, &owner).await.unwrap();
        assert_eq!(listed.value[0].area, LedgerNumber::Passthrough(huge));
        assert_eq!(listed.value[0].area.to_u256(), huge);
        assert_eq!(listed.warnings.len(), 1);

        let result = OperationResult::from_normalized(Ok(listed));
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["data"][0]["area"], json!("18446744073709551616"));
        assert_eq!(body["data"][0]["price"], json!(10));
        assert_eq!(body["warnings"].as_array().map(Vec::len), Some(1));
    }
}
