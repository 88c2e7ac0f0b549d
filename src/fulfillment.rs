//! Background fulfillment of accepted orders.
//!
//! Every accepted order gets exactly one scheduled attempt to walk
//! `pending -> processing -> completed` on fixed delays. An unexpected failure
//! moves it to `failed` and the attempt ends; nothing is retried and no stock
//! is returned. Steps an administrator already took are skipped, and a
//! terminal order ends the attempt quietly. On startup
//! [`FulfillmentScheduler::recover`] re-drives orders a previous process left
//! in a non-terminal state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::actor_framework::ResourceClient;
use crate::app_system::Config;
use crate::domain::{Order, OrderStatus};
use crate::order_actor::{OrderAction, OrderError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FulfillmentSchedule {
    /// Wait between acceptance and the start of the sequence.
    pub dispatch_delay: Duration,
    /// Wait before entering `processing`.
    pub processing_delay: Duration,
    /// Wait in `processing` before entering `completed`.
    pub completion_delay: Duration,
}

impl Default for FulfillmentSchedule {
    fn default() -> Self {
        Self {
            dispatch_delay: Duration::from_millis(100),
            processing_delay: Duration::from_secs(2),
            completion_delay: Duration::from_secs(3),
        }
    }
}

impl FulfillmentSchedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dispatch_delay: config.dispatch_delay,
            processing_delay: config.processing_delay,
            completion_delay: config.completion_delay,
        }
    }

    /// Time from acceptance until an undisturbed order is completed.
    pub fn total(&self) -> Duration {
        self.dispatch_delay + self.processing_delay + self.completion_delay
    }
}

#[derive(Clone)]
pub struct FulfillmentScheduler {
    ledger: ResourceClient<Order>,
    schedule: FulfillmentSchedule,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl FulfillmentScheduler {
    pub fn new(ledger: ResourceClient<Order>, schedule: FulfillmentSchedule) -> Self {
        Self {
            ledger,
            schedule,
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn schedule(&self) -> FulfillmentSchedule {
        self.schedule
    }

    /// Starts the full sequence for a freshly accepted order.
    pub fn dispatch(&self, order_id: String) {
        self.spawn(order_id, OrderStatus::Pending);
    }

    /// Re-drives one order from whatever non-terminal status it is in.
    pub fn resume(&self, order: &Order) -> bool {
        if order.status.is_terminal() {
            return false;
        }
        self.spawn(order.id.clone(), order.status);
        true
    }

    /// Resumes every order left in `pending` or `processing`.
    #[instrument(name = "fulfillment_recovery", skip(self))]
    pub async fn recover(&self) -> Result<usize, OrderError> {
        let stuck = self.ledger.query(|order: &Order| !order.status.is_terminal()).await?;
        let resumed = stuck.iter().filter(|order| self.resume(order)).count();
        if resumed > 0 {
            info!(resumed, "Resumed unfinished orders");
        }
        Ok(resumed)
    }

    /// Aborts all in-flight sequences.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !tasks.is_empty() {
            warn!(in_flight = tasks.len(), "Abandoning in-flight fulfillment sequences");
        }
        tasks.abort_all();
    }

    fn spawn(&self, order_id: String, from: OrderStatus) {
        let ledger = self.ledger.clone();
        let schedule = self.schedule;
        let span = tracing::info_span!("fulfillment", order_id = %order_id);

        let mut tasks = self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        while tasks.try_join_next().is_some() {}
        tasks.spawn(run_sequence(ledger, schedule, order_id, from).instrument(span));
    }
}

async fn run_sequence(
    ledger: ResourceClient<Order>,
    schedule: FulfillmentSchedule,
    order_id: String,
    from: OrderStatus,
) {
    let steps = [
        (OrderStatus::Processing, schedule.dispatch_delay + schedule.processing_delay),
        (OrderStatus::Completed, schedule.completion_delay),
    ];

    let outcome = async {
        for (target, delay) in steps.into_iter().filter(|(target, _)| *target > from) {
            tokio::time::sleep(delay).await;
            match transition(&ledger, &order_id, target).await {
                Ok(_) if target == OrderStatus::Processing => info!("Order processing started"),
                Ok(_) => info!("Order processing completed"),
                Err(OrderError::InvalidTransition { from: current, .. }) if current.is_terminal() => {
                    // Someone else (an administrator) already settled the order.
                    info!(status = %current, "Order left the fulfillment path, stopping");
                    return Ok(());
                }
                Err(OrderError::InvalidTransition { from: current, .. }) if current >= target => {
                    debug!(status = %current, "Order already advanced, skipping step");
                }
                Err(e) => return Err(e),
            }
        }
        Ok::<(), OrderError>(())
    }
    .await;

    if let Err(e) = outcome {
        error!(error = %e, "Error processing order asynchronously");
        if let Err(e) = transition(&ledger, &order_id, OrderStatus::Failed).await {
            error!(error = %e, "Could not mark order as failed");
        }
    }
}

async fn transition(
    ledger: &ResourceClient<Order>,
    order_id: &str,
    to: OrderStatus,
) -> Result<Order, OrderError> {
    ledger
        .perform_action(order_id.to_string(), OrderAction::Transition { to, at: Utc::now() })
        .await
}
