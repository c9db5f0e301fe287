use crate::domain::amount::Amount;
use crate::domain::order::{LogEntry, Order, OrderId, OrderStatus};
use crate::domain::ports::{AuditStore, TransferExecutor, TxId};
use crate::error::{PersistenceError, TransferError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;

/// Human-readable prefix of Pactus account addresses.
const ADDRESS_PREFIX: &str = "pc1";

/// A thread-safe in-memory audit store.
///
/// Clones share the same orders and log entries, so a test or the CLI can keep
/// a clone to inspect what the bridge recorded.
#[derive(Default, Clone)]
pub struct InMemoryAuditStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    logs: Arc<RwLock<Vec<LogEntry>>>,
}

impl InMemoryAuditStore {
    /// Creates a new, empty in-memory audit store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn add_order(&self, order: Order) -> Result<(), PersistenceError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, PersistenceError> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn add_log(&self, entry: LogEntry) -> Result<(), PersistenceError> {
        self.logs.write().await.push(entry);
        Ok(())
    }

    async fn logs(&self, order_id: &OrderId) -> Result<Vec<LogEntry>, PersistenceError> {
        let logs = self.logs.read().await;
        Ok(logs
            .iter()
            .filter(|entry| &entry.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), PersistenceError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(id)
            .ok_or_else(|| PersistenceError::OrderNotFound(id.clone()))?;
        order.status = status;
        Ok(())
    }
}

/// A transfer accepted by [`DryRunWallet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub tx_id: TxId,
    pub receiver: String,
    pub memo: String,
    pub amount: Amount,
}

#[derive(Default)]
struct WalletState {
    transfers: Vec<RecordedTransfer>,
    rejected: HashSet<String>,
}

/// Wallet that records transfers instead of broadcasting them.
///
/// Transaction ids are 64 hex digits derived from a counter. Clones share
/// state.
#[derive(Default, Clone)]
pub struct DryRunWallet {
    state: Arc<Mutex<WalletState>>,
    next_tx: Arc<AtomicU64>,
    releases: Arc<AtomicU64>,
}

impl DryRunWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every transfer to `receiver` fail.
    pub fn reject_receiver(self, receiver: impl Into<String>) -> Self {
        self.state().rejected.insert(receiver.into());
        self
    }

    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.state().transfers.clone()
    }

    /// Number of times the wallet was actually released (0 or 1).
    pub fn release_count(&self) -> u64 {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.release_count() > 0
    }

    fn state(&self) -> MutexGuard<'_, WalletState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TransferExecutor for DryRunWallet {
    async fn transfer(
        &self,
        receiver: &str,
        memo: &str,
        amount: Amount,
    ) -> Result<TxId, TransferError> {
        if self.is_released() {
            return Err(TransferError::Closed);
        }
        if !receiver.starts_with(ADDRESS_PREFIX) {
            return Err(TransferError::InvalidReceiver(receiver.to_string()));
        }

        let mut state = self.state();
        if state.rejected.contains(receiver) {
            return Err(TransferError::Rejected(format!(
                "receiver {receiver} is not allowed"
            )));
        }

        let tx_id = format!("{:064x}", self.next_tx.fetch_add(1, Ordering::SeqCst) + 1);
        state.transfers.push(RecordedTransfer {
            tx_id: tx_id.clone(),
            receiver: receiver.to_string(),
            memo: memo.to_string(),
            amount,
        });
        Ok(tx_id)
    }

    async fn release(&self) {
        // Only the first caller moves the counter from 0 to 1.
        let _ = self
            .releases
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst);
    }
}
