//! Single choke point for ledger traffic.
//!
//! Applies the caller's deadline, verifies receipts and maps gateway failures
//! into [`WorkflowError`]. No retries happen here: ledger transactions are not
//! guaranteed idempotent.

use std::future::Future;
use std::time::Duration;

use landreg_auth::Actor;

use crate::error::WorkflowError;
use crate::ledger::{ContractCall, LedgerGateway, RawValue, ReceiptStatus, TransactionReceipt};

/// Who is calling, and how long they are willing to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub actor: Actor,
    /// Overrides the engine's default ledger timeout for this call.
    pub deadline: Option<Duration>,
}

impl CallContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LedgerClient<G> {
    gateway: G,
    default_timeout: Duration,
}

impl<G> LedgerClient<G> {
    pub fn new(gateway: G, default_timeout: Duration) -> Self {
        Self {
            gateway,
            default_timeout,
        }
    }

    fn deadline(&self, ctx: &CallContext) -> Duration {
        ctx.deadline.unwrap_or(self.default_timeout)
    }
}

impl<G> LedgerClient<G>
where
    G: LedgerGateway,
{
    /// Submit a transaction signed by the context's actor.
    ///
    /// Succeeds only on a committed receipt. On timeout the transaction may or
    /// may not have committed; callers must re-query to find out.
    pub async fn submit(
        &self,
        ctx: &CallContext,
        call: ContractCall,
    ) -> Result<TransactionReceipt, WorkflowError> {
        let deadline = self.deadline(ctx);
        let signer = &ctx.actor.account;
        tracing::debug!(method = call.method, signer = %signer, "submitting ledger transaction");

        let receipt = match tokio::time::timeout(
            deadline,
            self.gateway.submit_transaction(&call, signer),
        )
        .await
        {
            Err(_) => {
                tracing::warn!(method = call.method, ?deadline, "ledger transaction timed out; outcome unknown");
                return Err(WorkflowError::LedgerTimeout(deadline));
            }
            Ok(Err(e)) => {
                tracing::warn!(method = call.method, error = %e, "ledger transaction failed");
                return Err(e.into());
            }
            Ok(Ok(receipt)) => receipt,
        };

        if let ReceiptStatus::Reverted(revert) = &receipt.status {
            tracing::warn!(
                method = call.method,
                tx = %receipt.transaction_hash,
                reason = %revert,
                "ledger transaction reverted"
            );
            return Err(revert.clone().into());
        }

        tracing::debug!(
            method = call.method,
            tx = %receipt.transaction_hash,
            block = %receipt.block_number,
            "ledger transaction committed"
        );
        Ok(receipt)
    }

    /// Bound an operation that makes several ledger calls by one deadline.
    ///
    /// Each inner call still applies the deadline on its own; this caps
    /// their sum.
    pub async fn within<T, F>(&self, ctx: &CallContext, operation: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        let deadline = self.deadline(ctx);
        match tokio::time::timeout(deadline, operation).await {
            Err(_) => {
                tracing::warn!(?deadline, "operation exceeded its deadline; outcome unknown");
                Err(WorkflowError::LedgerTimeout(deadline))
            }
            Ok(result) => result,
        }
    }

    /// Run a read-only query. Every failure is an infrastructure failure.
    pub async fn query(
        &self,
        ctx: &CallContext,
        call: ContractCall,
    ) -> Result<RawValue, WorkflowError> {
        let deadline = self.deadline(ctx);
        tracing::debug!(method = call.method, "querying ledger");

        match tokio::time::timeout(deadline, self.gateway.query(&call)).await {
            Err(_) => {
                tracing::warn!(method = call.method, ?deadline, "ledger query timed out");
                Err(WorkflowError::LedgerTimeout(deadline))
            }
            Ok(Err(e)) => {
                tracing::warn!(method = call.method, error = %e, "ledger query failed");
                Err(WorkflowError::from_query(e))
            }
            Ok(Ok(raw)) => Ok(raw),
        }
    }
}
