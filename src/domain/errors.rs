use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),
    #[error("Cannot {action} an order in status {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },
    #[error("Delivery code does not match")]
    OtpMismatch,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Order was modified concurrently")]
    Conflict,
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub(crate) fn transition(from: OrderStatus, action: &'static str) -> Self {
        DomainError::InvalidTransition { from, action }
    }
}
