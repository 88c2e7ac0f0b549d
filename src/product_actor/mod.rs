//! Product-specific domain logic, including stock management actions.

mod actions;
pub mod entity;
pub mod error;
pub mod seed;

pub use actions::*;
pub use error::*;

use crate::clients::ProductClient;
use crate::actor_framework::{FrameworkError, ResourceActor};
use crate::domain::Product;
use crate::journal::JsonLinesJournal;
use std::path::Path;

fn next_product_id() -> String {
    format!("product_{}", uuid::Uuid::new_v4().simple())
}

/// Creates a new in-memory Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, next_product_id);
    (actor, ProductClient::new(generic_client))
}

/// Creates a Product actor whose state is journaled under `dir`.
pub fn with_journal(
    buffer_size: usize,
    dir: &Path,
) -> Result<(ResourceActor<Product>, ProductClient), FrameworkError> {
    let journal = JsonLinesJournal::for_entity::<Product>(dir);
    let (actor, generic_client) = ResourceActor::with_journal(buffer_size, next_product_id, journal)?;
    Ok((actor, ProductClient::new(generic_client)))
}
