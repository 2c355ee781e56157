use super::payment::{Amount, Currency, Payment, PaymentId};
use crate::error::Result;
use async_trait::async_trait;

/// Key-value persistence for payment records.
///
/// The store is a passive holder: it carries no business logic and offers
/// last-writer-wins semantics per payment id. Backends that need to survive
/// real write races can harden `save` with a compare-and-swap on status.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn save(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>>;
    /// Every record ever stored, terminal ones included. Records are never
    /// deleted, so this is the full audit trail.
    async fn all_payments(&self) -> Result<Vec<Payment>>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;

/// Outcome of a settlement charge as reported by the provider.
///
/// A decline is a business answer, not an error: the provider looked at the
/// charge and said no. Infrastructure failures of the call itself surface as
/// an `Err` from [`SettlementGateway::charge`] instead.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ChargeOutcome {
    Approved { transaction_ref: String },
    Declined { reason: String },
}

/// External settlement provider boundary.
///
/// Implementations may be slow; callers bound the call with a deadline and
/// treat a timeout like any other infrastructure failure.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    async fn charge(
        &self,
        amount: Amount,
        currency: Currency,
        payment_id: PaymentId,
    ) -> Result<ChargeOutcome>;
}

pub type SettlementGatewayBox = Box<dyn SettlementGateway>;
