use payflow::application::service::PaymentService;
use payflow::domain::payment::PaymentStatus;
use payflow::domain::ports::PaymentStore;
use payflow::infrastructure::gateway::SimulatedGateway;
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
use rand::Rng;
use rust_decimal::Decimal;
use std::time::Duration;

/// Sweeps random valid amounts through the full pipeline and checks the
/// record invariants hold on whatever terminal state each one lands in.
#[tokio::test]
async fn test_record_invariants_hold_across_random_inputs() {
    let store = InMemoryPaymentStore::new();
    let gateway = SimulatedGateway::with_latency(Duration::ZERO);
    let service = PaymentService::new(Box::new(store.clone()), Box::new(gateway));

    let mut rng = rand::thread_rng();
    let currencies = ["USD", "eur", "Gbp"];

    for i in 0..200 {
        let cents: i64 = rng.gen_range(1..=100_000);
        let amount = Decimal::new(cents, 2);
        let currency = currencies[i % currencies.len()];

        let payment = service.initiate(amount, currency).await.unwrap();
        service.confirm(payment.id()).await.unwrap();
    }

    let records = store.all_payments().await.unwrap();
    assert_eq!(records.len(), 200);

    for record in records {
        match record.status() {
            PaymentStatus::Captured => {
                assert!(record.gateway_transaction_id().is_some());
                assert!(record.failure_reason().is_none());
                assert!(record.processed_at().is_some());
            }
            PaymentStatus::Failed => {
                assert_eq!(record.failure_reason(), Some("card_declined"));
                assert!(record.gateway_transaction_id().is_none());
                assert!(record.processed_at().is_some());
            }
            other => panic!("confirm left a record in {other}"),
        }
    }
}
