//! Entry point bundling the catalog and the three workflows over one ledger.

use crate::catalog::ParcelCatalog;
use crate::client::LedgerClient;
use crate::config::EngineConfig;
use crate::ledger::LedgerGateway;
use crate::workflows::{PurchaseWorkflow, RegistrationWorkflow, SaleWorkflow};

/// The land registry engine.
///
/// Holds no registry state of its own; every component talks to the same
/// gateway through a [`LedgerClient`] configured from [`EngineConfig`].
///
/// ```ignore
/// let ledger = Arc::new(InMemoryLedger::with_administrators([admin]));
/// let registry = LandRegistry::new(ledger, EngineConfig::from_env());
/// let id = registry.registration().submit(&ctx, &draft).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LandRegistry<G> {
    config: EngineConfig,
    catalog: ParcelCatalog<G>,
    registration: RegistrationWorkflow<G>,
    sales: SaleWorkflow<G>,
    purchases: PurchaseWorkflow<G>,
}

impl<G> LandRegistry<G>
where
    G: LedgerGateway + Clone,
{
    pub fn new(gateway: G, config: EngineConfig) -> Self {
        let client = LedgerClient::new(gateway, config.ledger_timeout);
        tracing::info!(
            ledger_timeout = ?config.ledger_timeout,
            purchase_precheck = config.purchase_precheck,
            "land registry initialised"
        );
        Self {
            catalog: ParcelCatalog::new(client.clone()),
            registration: RegistrationWorkflow::new(client.clone()),
            sales: SaleWorkflow::new(client.clone()),
            purchases: PurchaseWorkflow::new(client, config.purchase_precheck),
            config,
        }
    }
}

impl<G> LandRegistry<G> {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ParcelCatalog<G> {
        &self.catalog
    }

    pub fn registration(&self) -> &RegistrationWorkflow<G> {
        &self.registration
    }

    pub fn sales(&self) -> &SaleWorkflow<G> {
        &self.sales
    }

    pub fn purchases(&self) -> &PurchaseWorkflow<G> {
        &self.purchases
    }
}
