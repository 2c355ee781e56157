use crate::domain::payment::{Amount, Currency, PaymentId};
use crate::domain::ports::{ChargeOutcome, SettlementGateway};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::time::Duration;
use uuid::Uuid;

/// Deterministic stand-in for a real settlement provider.
///
/// Charges whose cent part is exactly 99 are declined with `card_declined`;
/// everything else is approved with a fresh `txn_` reference. This lets both
/// outcome paths be exercised end-to-end purely through the amount input.
pub struct SimulatedGateway {
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(100),
        }
    }

    /// Overrides the simulated provider latency (tests use zero).
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementGateway for SimulatedGateway {
    async fn charge(
        &self,
        amount: Amount,
        _currency: Currency,
        payment_id: PaymentId,
    ) -> Result<ChargeOutcome> {
        tokio::time::sleep(self.latency).await;

        let cents = (amount.value() * Decimal::from(100))
            .trunc()
            .to_i64()
            .unwrap_or(0);

        if cents % 100 == 99 {
            tracing::debug!(payment_id = %payment_id, "simulated decline");
            return Ok(ChargeOutcome::Declined {
                reason: "card_declined".to_string(),
            });
        }

        Ok(ChargeOutcome::Approved {
            transaction_ref: format!("txn_{}", Uuid::new_v4()),
        })
    }
}
