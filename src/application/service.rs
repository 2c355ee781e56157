use crate::domain::payment::{Payment, PaymentId, PaymentStatus};
use crate::domain::ports::{
    ChargeOutcome, PaymentStore, PaymentStoreBox, SettlementGateway, SettlementGatewayBox,
};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::time::Duration;

/// Upper bound on a single settlement charge; a slower gateway is treated
/// as failed.
pub const DEFAULT_CHARGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates the payment lifecycle against the store and gateway ports.
///
/// The service is the sole mutator of payment records. It persists after
/// every transition, so a crash mid-flow leaves an auditable record of the
/// last completed step instead of silent data loss. It holds no lock across
/// the gateway await; two concurrent `confirm` calls for the same id can
/// race through the state guard (the store contract is last-writer-wins).
pub struct PaymentService {
    store: PaymentStoreBox,
    gateway: SettlementGatewayBox,
    charge_timeout: Duration,
}

impl PaymentService {
    /// Creates a new `PaymentService` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store holding payment records.
    /// * `gateway` - The external settlement provider.
    pub fn new(store: PaymentStoreBox, gateway: SettlementGatewayBox) -> Self {
        Self {
            store,
            gateway,
            charge_timeout: DEFAULT_CHARGE_TIMEOUT,
        }
    }

    /// Overrides the deadline applied to each settlement charge.
    pub fn with_charge_timeout(mut self, timeout: Duration) -> Self {
        self.charge_timeout = timeout;
        self
    }

    /// Creates a payment in `Initiated` state and persists it.
    ///
    /// Argument validation happens in the entity constructor, before any
    /// persistence.
    pub async fn initiate(&self, amount: Decimal, currency: &str) -> Result<Payment> {
        let payment = Payment::new(amount, currency)?;
        self.store.save(payment.clone()).await?;
        tracing::info!(
            payment_id = %payment.id(),
            amount = %payment.amount(),
            currency = %payment.currency(),
            "payment initiated"
        );
        Ok(payment)
    }

    /// Drives an initiated payment through validate -> authorize -> capture.
    ///
    /// Re-confirming an already captured payment returns it unchanged
    /// without touching the gateway. Confirming from any other non-initiated
    /// state is a conflict ([`PaymentError::InvalidTransition`]) that the
    /// caller must not retry blindly. A gateway decline or infrastructure
    /// failure ends in a persisted `Failed` record returned as data; every
    /// path out of the gateway call ends in a final save.
    pub async fn confirm(&self, id: PaymentId) -> Result<Payment> {
        let Some(mut payment) = self.store.get(id).await? else {
            return Err(PaymentError::NotFound(id));
        };

        if payment.status() == PaymentStatus::Captured {
            tracing::info!(payment_id = %id, "payment already captured");
            return Ok(payment);
        }

        if payment.status() != PaymentStatus::Initiated {
            return Err(PaymentError::InvalidTransition {
                operation: "confirm",
                state: payment.status(),
            });
        }

        payment.validate()?;
        self.store.save(payment.clone()).await?;

        tracing::info!(payment_id = %id, "charging settlement gateway");
        match self.charge(&payment).await {
            Ok(ChargeOutcome::Approved { transaction_ref }) => {
                tracing::info!(payment_id = %id, transaction_ref = %transaction_ref, "charge approved");
                payment.authorize(transaction_ref)?;
                self.store.save(payment.clone()).await?;
                payment.capture()?;
            }
            Ok(ChargeOutcome::Declined { reason }) => {
                tracing::warn!(payment_id = %id, reason = %reason, "charge declined");
                payment.mark_failed(reason)?;
            }
            Err(err) => {
                tracing::error!(payment_id = %id, error = %err, "gateway call failed");
                payment.mark_failed(format!("system error: {err}"))?;
            }
        }

        self.store.save(payment.clone()).await?;
        Ok(payment)
    }

    /// Pure read, no side effects.
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.store.get(id).await
    }

    /// Consumes the service and returns every stored payment record.
    pub async fn into_records(self) -> Result<Vec<Payment>> {
        self.store.all_payments().await
    }

    async fn charge(&self, payment: &Payment) -> Result<ChargeOutcome> {
        let call = self
            .gateway
            .charge(payment.amount(), payment.currency(), payment.id());
        match tokio::time::timeout(self.charge_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(PaymentError::Gateway(format!(
                "charge timed out after {:?}",
                self.charge_timeout
            ))),
        }
    }
}
