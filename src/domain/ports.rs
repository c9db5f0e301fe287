use super::amount::Amount;
use super::order::{LogEntry, Order, OrderId, OrderStatus};
use crate::error::{PersistenceError, TransferError};
use async_trait::async_trait;

/// Identifier of a broadcast destination transaction.
pub type TxId = String;

/// Durable append-only audit log plus order status store.
///
/// Every failure is a `PersistenceError` and callers treat it as fatal.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn add_order(&self, order: Order) -> Result<(), PersistenceError>;
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError>;
    async fn all_orders(&self) -> Result<Vec<Order>, PersistenceError>;
    async fn add_log(&self, entry: LogEntry) -> Result<(), PersistenceError>;
    /// Entries for one order, in append order.
    async fn logs(&self, order_id: &OrderId) -> Result<Vec<LogEntry>, PersistenceError>;
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), PersistenceError>;
}

/// Signs and broadcasts value transfers on the destination ledger.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn transfer(
        &self,
        receiver: &str,
        memo: &str,
        amount: Amount,
    ) -> Result<TxId, TransferError>;

    /// Releases the underlying connection. Only the first call has an effect.
    async fn release(&self);
}

pub type AuditStoreBox = Box<dyn AuditStore>;
pub type TransferExecutorBox = Box<dyn TransferExecutor>;
