#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use wrapto_bridge::domain::amount::Amount;
use wrapto_bridge::domain::message::Message;
use wrapto_bridge::domain::order::{LogEntry, Order, OrderId, OrderStatus};
use wrapto_bridge::domain::ports::{AuditStore, TransferExecutor, TxId};
use wrapto_bridge::error::{PersistenceError, TransferError};
use wrapto_bridge::infrastructure::in_memory::{DryRunWallet, InMemoryAuditStore};

/// Which audit call the [`FlakyAuditStore`] refuses.
#[derive(Clone, Copy, Debug)]
pub enum FailOn {
    Log(&'static str),
    Status(OrderStatus),
}

/// In-memory audit store that fails one kind of call.
#[derive(Clone)]
pub struct FlakyAuditStore {
    pub inner: InMemoryAuditStore,
    fail_on: FailOn,
    calls: Arc<AtomicUsize>,
}

impl FlakyAuditStore {
    pub fn new(inner: InMemoryAuditStore, fail_on: FailOn) -> Self {
        Self {
            inner,
            fail_on,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `add_log` and `update_order_status` calls seen.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditStore for FlakyAuditStore {
    async fn add_order(&self, order: Order) -> Result<(), PersistenceError> {
        self.inner.add_order(order).await
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError> {
        self.inner.get_order(id).await
    }

    async fn all_orders(&self) -> Result<Vec<Order>, PersistenceError> {
        self.inner.all_orders().await
    }

    async fn add_log(&self, entry: LogEntry) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let FailOn::Log(description) = self.fail_on
            && entry.description == description
        {
            return Err(PersistenceError::Storage("disk full".to_string()));
        }
        self.inner.add_log(entry).await
    }

    async fn logs(&self, order_id: &OrderId) -> Result<Vec<LogEntry>, PersistenceError> {
        self.inner.logs(order_id).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let FailOn::Status(failing) = self.fail_on
            && failing == status
        {
            return Err(PersistenceError::Unavailable);
        }
        self.inner.update_order_status(id, status).await
    }
}

/// Wallet that raises cancellation from inside every transfer.
pub struct CancellingWallet {
    inner: DryRunWallet,
    cancel: watch::Sender<bool>,
}

impl CancellingWallet {
    pub fn new(inner: DryRunWallet, cancel: watch::Sender<bool>) -> Self {
        Self { inner, cancel }
    }
}

#[async_trait]
impl TransferExecutor for CancellingWallet {
    async fn transfer(
        &self,
        receiver: &str,
        memo: &str,
        amount: Amount,
    ) -> Result<TxId, TransferError> {
        self.cancel.send_replace(true);
        self.inner.transfer(receiver, memo, amount).await
    }

    async fn release(&self) {
        self.inner.release().await;
    }
}

pub fn order(id: &str, receiver: &str, amount: Decimal) -> Order {
    Order::new(id, receiver, amount)
}

pub fn to_pactus(order: Order) -> Message {
    Message::new("POLYGON", "PACTUS", order)
}

/// Registers each message's order as pending.
pub async fn register(store: &dyn AuditStore, messages: &[Message]) {
    for msg in messages {
        store.add_order(msg.payload.clone()).await.unwrap();
    }
}

pub async fn status_of(store: &dyn AuditStore, id: &str) -> OrderStatus {
    store
        .get_order(&OrderId::from(id))
        .await
        .unwrap()
        .expect("order registered")
        .status
}

pub async fn descriptions(store: &dyn AuditStore, id: &str) -> Vec<String> {
    store
        .logs(&OrderId::from(id))
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.description)
        .collect()
}
