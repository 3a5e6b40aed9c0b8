//! The module contains the errors the engine can throw.
//!
//! Every variant maps to a user-recoverable condition: callers turn these
//! into plain-language replies instead of crashing the conversation.
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid promo code")]
    InvalidPromoCode,
    #[error("No saved card available to cover the remaining balance")]
    NoPaymentMethod,
    #[error("storage: {0}")]
    Storage(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidPromoCode, Self::InvalidPromoCode) => true,
            (Self::NoPaymentMethod, Self::NoPaymentMethod) => true,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            _ => false,
        }
    }
}
