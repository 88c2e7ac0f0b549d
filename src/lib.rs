//! Order intake and asynchronous fulfillment.
//!
//! Orders are accepted synchronously (admission control, validation, stock
//! reservation, ledger write) and then walked through their lifecycle by a
//! background scheduler. Products and orders each live behind a
//! [`actor_framework::ResourceActor`].

pub mod domain;
pub mod clients;

pub mod app_system;
pub mod fulfillment;
pub mod load_shedding;
pub mod metrics;

pub mod actor_framework;
pub mod journal;
pub mod order_actor;
pub mod product_actor;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;
