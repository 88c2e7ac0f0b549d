use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus};
use super::actions::OrderAction;
use super::error::OrderError;

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = (); // Intake fields are immutable
    type Action = OrderAction;
    type ActionResult = Order;
    type Error = OrderError;

    const KIND: &'static str = "order";

    fn id(&self) -> &String { &self.id }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order starts `pending` and its total is fixed here from the unit
    /// price captured by the stock reservation.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.quantity == 0 {
            return Err(OrderError::ValidationError("Quantity must be at least 1".into()));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            customer: params.customer,
            address: params.address,
            product_id: params.product_id,
            quantity: params.quantity,
            total_amount: params.unit_price * f64::from(params.quantity),
            status: OrderStatus::Pending,
            notes: params.notes,
            created_at: now,
            updated_at: now,
            processed_at: None,
            completed_at: None,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Handles order-specific actions.
    ///
    /// # Errors
    /// `InvalidTransition` when the move is not in the status table.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, OrderError> {
        match action {
            OrderAction::Transition { to, at } => {
                self.transition(to, at)?;
                Ok(self.clone())
            }
        }
    }
}

impl Order {
    fn transition(&mut self, to: OrderStatus, at: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition { from: self.status, to });
        }

        // Clamp so timestamps never run backwards across a wall-clock step.
        let at = at.max(self.updated_at);
        match to {
            OrderStatus::Processing => self.processed_at = Some(at),
            OrderStatus::Completed => self.completed_at = Some(at),
            _ => {}
        }
        self.status = to;
        self.updated_at = at;
        Ok(())
    }
}
