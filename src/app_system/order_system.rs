use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::clients::{OrderClient, ProductClient};
use crate::fulfillment::{FulfillmentSchedule, FulfillmentScheduler};
use crate::load_shedding::LoadSheddingGate;
use crate::{order_actor, product_actor};
use super::{Config, SystemError};

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, resuming
/// unfinished fulfillment, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    scheduler: FulfillmentScheduler,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the system with the admission gate described by `config`.
    pub async fn start(config: &Config) -> Result<Self, SystemError> {
        Self::start_with(config, LoadSheddingGate::from_config(config)).await
    }

    #[instrument(name = "system_start", skip_all, fields(mode = ?config.mode))]
    pub async fn start_with(config: &Config, gate: LoadSheddingGate) -> Result<Self, SystemError> {
        let capacity = config.channel_capacity;

        // 1. Setup Product Service
        let (product_actor, product_client) = match &config.journal_dir {
            Some(dir) => product_actor::with_journal(capacity, dir)?,
            None => product_actor::new(capacity),
        };
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Setup Order ledger
        let (order_actor, order_resource_client) = match &config.journal_dir {
            Some(dir) => order_actor::with_journal(capacity, dir)?,
            None => order_actor::new(capacity),
        };
        let order_handle = tokio::spawn(order_actor.run());

        // 3. Fulfillment and intake
        let scheduler = FulfillmentScheduler::new(
            order_resource_client.clone(),
            FulfillmentSchedule::from_config(config),
        );
        let order_client = OrderClient::new(
            order_resource_client,
            product_client.clone(),
            Arc::new(gate),
            scheduler.clone(),
        );

        let system = Self {
            order_client,
            product_client,
            scheduler,
            handles: vec![product_handle, order_handle],
        };

        // 4. Pick up orders a previous run left unfinished
        let resumed = system.scheduler.recover().await?;
        info!(resumed, journaled = config.journal_dir.is_some(), "Order system started");
        Ok(system)
    }

    pub fn schedule(&self) -> FulfillmentSchedule {
        self.scheduler.schedule()
    }

    /// Abandons in-flight fulfillment, stops both actors and waits for them.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        self.scheduler.shutdown();

        if let Err(e) = self.order_client.shutdown_order_actor().await {
            error!(error = %e, "Order actor already stopped");
        }
        if let Err(e) = self.product_client.shutdown_product_actor().await {
            error!(error = %e, "Product actor already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::Shutdown(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
