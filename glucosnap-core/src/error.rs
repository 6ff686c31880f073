//! Errors raised by the Health Data Store.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Input rejected before it reaches the Persistence Gateway.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("HbA1c value {value} is out of range (expected {min} to {max})")]
    A1cOutOfRange { value: f64, min: f64, max: f64 },

    #[error("A meal must contain at least one item")]
    EmptyMeal,
}

#[derive(Debug, Error)]
pub enum HealthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
