use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::order_actor::OrderError;

/// Failures while starting or stopping the order system.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Journal could not be opened: {0}")]
    Journal(#[from] FrameworkError),
    #[error("Recovery sweep failed: {0}")]
    Recovery(#[from] OrderError),
    #[error("Actor task failed: {0}")]
    Shutdown(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: invalid value {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
