#![allow(dead_code)]

use async_trait::async_trait;
use payflow::application::service::PaymentService;
use payflow::domain::payment::{Amount, Currency, Payment, PaymentId, PaymentStatus};
use payflow::domain::ports::{ChargeOutcome, PaymentStore, SettlementGateway};
use payflow::error::{PaymentError, Result};
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the scripted gateway answers next.
#[derive(Debug, Clone)]
pub enum Script {
    Approve(&'static str),
    Decline(&'static str),
    Error(&'static str),
}

/// Settlement gateway double that replays a fixed script and counts calls.
///
/// An exhausted script answers with a gateway error, so a test that charges
/// more often than scripted fails loudly on its call-count assertion.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<VecDeque<Script>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettlementGateway for ScriptedGateway {
    async fn charge(
        &self,
        _amount: Amount,
        _currency: Currency,
        _payment_id: PaymentId,
    ) -> Result<ChargeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Script::Approve(transaction_ref)) => Ok(ChargeOutcome::Approved {
                transaction_ref: transaction_ref.to_string(),
            }),
            Some(Script::Decline(reason)) => Ok(ChargeOutcome::Declined {
                reason: reason.to_string(),
            }),
            Some(Script::Error(message)) => Err(PaymentError::Gateway(message.to_string())),
            None => Err(PaymentError::Gateway("gateway script exhausted".to_string())),
        }
    }
}

/// Store wrapper that records the status of every saved snapshot, letting
/// tests assert the persistence sequence around each transition.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryPaymentStore,
    saved_statuses: Arc<Mutex<Vec<PaymentStatus>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_statuses(&self) -> Vec<PaymentStatus> {
        self.saved_statuses.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentStore for RecordingStore {
    async fn save(&self, payment: Payment) -> Result<()> {
        self.saved_statuses.lock().unwrap().push(payment.status());
        self.inner.save(payment).await
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.inner.get(id).await
    }

    async fn all_payments(&self) -> Result<Vec<Payment>> {
        self.inner.all_payments().await
    }
}

pub fn service_with(
    script: Vec<Script>,
) -> (PaymentService, InMemoryPaymentStore, ScriptedGateway) {
    let store = InMemoryPaymentStore::new();
    let gateway = ScriptedGateway::new(script);
    let service = PaymentService::new(Box::new(store.clone()), Box::new(gateway.clone()));
    (service, store, gateway)
}
