use crate::domain::payment::{PaymentId, PaymentStatus};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Error taxonomy for the payment pipeline.
///
/// `InvalidArguments` and `InvalidTransition` are client-facing rejections:
/// the first fires before anything is persisted, the second before any side
/// effect. Gateway declines are not errors at all; they end up as data on a
/// `Failed` record. `Gateway` here means the call itself broke.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("invalid payment arguments: {0}")]
    InvalidArguments(String),
    #[error("payment {0} not found")]
    NotFound(PaymentId),
    #[error("cannot {operation} payment in state {state}")]
    InvalidTransition {
        operation: &'static str,
        state: PaymentStatus,
    },
    #[error("settlement gateway error: {0}")]
    Gateway(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaymentError {
    /// Storage backends wrap their engine-specific failures through here.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
