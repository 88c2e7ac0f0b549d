//! Order ledger: the order entity, its status transitions, and intake validation.

mod actions;
pub mod entity;
pub mod error;
pub mod intake;

pub use actions::*;
pub use error::*;

use crate::actor_framework::{FrameworkError, ResourceActor, ResourceClient};
use crate::domain::Order;
use crate::journal::JsonLinesJournal;
use std::path::Path;

fn next_order_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Creates a new in-memory Order ledger actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size, next_order_id)
}

/// Creates an Order ledger actor whose state is journaled under `dir`.
pub fn with_journal(
    buffer_size: usize,
    dir: &Path,
) -> Result<(ResourceActor<Order>, ResourceClient<Order>), FrameworkError> {
    let journal = JsonLinesJournal::for_entity::<Order>(dir);
    ResourceActor::with_journal(buffer_size, next_order_id, journal)
}
