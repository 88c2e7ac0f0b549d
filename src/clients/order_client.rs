use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tracing::{error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::ProductClient;
use crate::domain::{
    Acceptance, Order, OrderFilter, OrderRequest, OrderStats, OrderStatus, StatusStats,
};
use crate::fulfillment::FulfillmentScheduler;
use crate::load_shedding::{Admission, LoadSheddingGate};
use crate::metrics::OperationMetrics;
use crate::order_actor::{intake, OrderAction, OrderError};
use super::{paginate, Page, PageRequest};

const COLLECTION: &str = "orders";

/// What callers are told to expect after acceptance.
pub const ESTIMATED_PROCESSING_WINDOW: &str = "2-3 minutes";

/// Client for the Order ledger.
///
/// This client handles the intake orchestration: admission control,
/// validation, stock reservation, the ledger write, and handing the order to
/// the fulfillment scheduler.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    product_client: ProductClient,
    gate: Arc<LoadSheddingGate>,
    scheduler: FulfillmentScheduler,
    metrics: OperationMetrics,
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        product_client: ProductClient,
        gate: Arc<LoadSheddingGate>,
        scheduler: FulfillmentScheduler,
    ) -> Self {
        // Ledger timings land next to the catalog's.
        let metrics = product_client.metrics().clone();
        Self {
            inner,
            product_client,
            gate,
            scheduler,
            metrics,
        }
    }

    pub fn metrics(&self) -> &OperationMetrics {
        &self.metrics
    }

    /// Accepts an order and returns as soon as it is on the ledger as
    /// `pending`. Fulfillment continues in the background.
    #[instrument(
        skip(self, request),
        fields(product_id = %request.product_id, quantity = request.quantity)
    )]
    pub async fn accept_order(&self, request: OrderRequest) -> Result<Acceptance, OrderError> {
        info!("Processing accept_order request");

        // Step 1: Admission control
        if let Admission::Overloaded { retry_after } = self.gate.admit() {
            warn!(retry_after_secs = retry_after.as_secs(), "System under high load, rejecting order");
            return Err(OrderError::Overloaded { retry_after });
        }

        // Step 2: Validate input
        let validated = intake::validate(request).map_err(|e| {
            warn!(error = %e, "Order validation failed");
            e
        })?;
        let product_id = validated.product_id.clone();
        let quantity = validated.quantity;

        // Step 3: Reserve stock
        let reservation = match self.product_client.reserve_stock(product_id.clone(), quantity).await {
            Ok(reservation) => reservation,
            Err(e) => {
                warn!(error = %e, "Stock reservation failed");
                return Err(e.into());
            }
        };
        info!(unit_price = reservation.unit_price, remaining = reservation.remaining, "Stock reserved");

        // Step 4: Record the order, giving the stock back if that fails
        let create = self.inner.create(validated.into_create(reservation.unit_price));
        let order_id = match self.metrics.time("create", COLLECTION, create).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Error creating order, releasing reserved stock");
                if let Err(release_err) = self.product_client.release_stock(product_id, quantity).await {
                    error!(error = %release_err, "Stock release failed, reservation leaked");
                }
                return Err(e);
            }
        };

        // Step 5: Hand over to fulfillment
        self.scheduler.dispatch(order_id.clone());

        info!(order_id = %order_id, "Order created successfully");
        Ok(Acceptance {
            order_id,
            status: OrderStatus::Pending,
            estimated_window: ESTIMATED_PROCESSING_WINDOW.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: String) -> Result<Order, OrderError> {
        self.metrics
            .time("find_one", COLLECTION, self.inner.get(id.clone()))
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Orders matching `filter`, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter, page: PageRequest) -> Result<Page<Order>, OrderError> {
        let query = self.inner.query(move |order: &Order| filter.matches(order));
        let mut orders = self.metrics.time("find", COLLECTION, query).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(orders, page))
    }

    /// Administrative status override. Only moves allowed by the status
    /// table are accepted.
    #[instrument(skip(self))]
    pub async fn set_order_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        let action = OrderAction::Transition { to: status, at: Utc::now() };
        match self.inner.perform_action(id, action).await {
            Ok(order) => {
                info!(new_status = %order.status, "Order status updated");
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Order status update rejected");
                Err(e)
            }
        }
    }

    /// Counts and revenue per status plus intake over the last 24 hours.
    #[instrument(skip(self))]
    pub async fn order_stats(&self) -> Result<OrderStats, OrderError> {
        let orders = self.inner.query(|_: &Order| true).await?;
        let since = Utc::now() - ChronoDuration::hours(24);

        let mut groups: BTreeMap<OrderStatus, StatusStats> = BTreeMap::new();
        for order in &orders {
            let entry = groups.entry(order.status).or_insert(StatusStats {
                status: order.status,
                count: 0,
                total_amount: 0.0,
            });
            entry.count += 1;
            entry.total_amount += order.total_amount;
        }

        Ok(OrderStats {
            by_status: groups.into_values().collect(),
            total_orders: orders.len(),
            last_24h: orders.iter().filter(|order| order.created_at >= since).count(),
        })
    }
}

impl_client_methods!(OrderClient, Order, OrderError, order);
