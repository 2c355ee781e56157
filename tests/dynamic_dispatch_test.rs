use payflow::domain::payment::Payment;
use payflow::domain::ports::{
    PaymentStore, PaymentStoreBox, SettlementGateway, SettlementGatewayBox,
};
use payflow::infrastructure::gateway::SimulatedGateway;
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
use rust_decimal_macros::dec;
use std::time::Duration;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let store: PaymentStoreBox = Box::new(InMemoryPaymentStore::new());
    let gateway: SettlementGatewayBox =
        Box::new(SimulatedGateway::with_latency(Duration::ZERO));

    let payment = Payment::new(dec!(100.0), "USD").unwrap();
    let id = payment.id();
    let amount = payment.amount();
    let currency = payment.currency();

    // Verify Send + Sync by moving the boxed ports into spawned tasks.
    let store_handle = tokio::spawn(async move {
        store.save(payment).await.unwrap();
        store.get(id).await.unwrap().unwrap()
    });

    let gateway_handle =
        tokio::spawn(async move { gateway.charge(amount, currency, id).await.unwrap() });

    let stored = store_handle.await.unwrap();
    assert_eq!(stored.id(), id);

    gateway_handle.await.unwrap();
}
