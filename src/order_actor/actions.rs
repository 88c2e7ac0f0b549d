use chrono::{DateTime, Utc};

use crate::domain::OrderStatus;

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to `to`, stamping `at` on the matching timestamp.
    ///
    /// # Errors
    /// Fails with `InvalidTransition` if the status table forbids the move.
    Transition { to: OrderStatus, at: DateTime<Utc> },
}
