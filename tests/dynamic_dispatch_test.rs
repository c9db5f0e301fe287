use rust_decimal_macros::dec;
use wrapto_bridge::domain::amount::Amount;
use wrapto_bridge::domain::order::{LogEntry, Order, OrderId};
use wrapto_bridge::domain::ports::{AuditStoreBox, TransferExecutorBox};
use wrapto_bridge::infrastructure::in_memory::{DryRunWallet, InMemoryAuditStore};

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let store: AuditStoreBox = Box::new(InMemoryAuditStore::new());
    let wallet: TransferExecutorBox = Box::new(DryRunWallet::new());

    // Verify Send + Sync by spawning tasks
    let store_handle = tokio::spawn(async move {
        store
            .add_order(Order::new("o-1", "pc1zabc", dec!(1)))
            .await
            .unwrap();
        store
            .add_log(LogEntry::new(OrderId::from("o-1"), "PACTUS", "order received as message"))
            .await
            .unwrap();
        store.logs(&OrderId::from("o-1")).await.unwrap()
    });

    let wallet_handle = tokio::spawn(async move {
        let amount = Amount::try_from(dec!(1)).unwrap();
        let tx_id = wallet.transfer("pc1zabc", "memo", amount).await.unwrap();
        wallet.release().await;
        tx_id
    });

    let logs = store_handle.await.unwrap();
    assert_eq!(logs.len(), 1);

    let tx_id = wallet_handle.await.unwrap();
    assert_eq!(tx_id.len(), 64);
}
