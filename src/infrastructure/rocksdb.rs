use crate::domain::order::{LogEntry, Order, OrderId, OrderStatus};
use crate::domain::ports::AuditStore;
use crate::error::PersistenceError;
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family for storing audit log entries.
pub const CF_LOGS: &str = "logs";

/// A persistent audit store using RocksDB.
///
/// Orders are keyed by their id. Log entries are keyed by the order id, a
/// zero byte and a big-endian sequence number, so a prefix scan returns one
/// order's entries in append order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBAuditStore {
    db: Arc<DB>,
    sequence: Arc<AtomicU64>,
}

impl RocksDBAuditStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "logs") exist
    /// and resumes the log sequence after the highest stored entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_logs = ColumnFamilyDescriptor::new(CF_LOGS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_logs])?;
        let store = Self {
            db: Arc::new(db),
            sequence: Arc::new(AtomicU64::new(0)),
        };
        let next = store.last_sequence()?.map_or(0, |seq| seq + 1);
        store.sequence.store(next, Ordering::SeqCst);

        Ok(store)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, PersistenceError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PersistenceError::Storage(format!("{name} column family not found")))
    }

    fn last_sequence(&self) -> Result<Option<u64>, PersistenceError> {
        let mut last = None;
        for item in self.db.iterator_cf(self.cf(CF_LOGS)?, IteratorMode::Start) {
            let (key, _) = item?;
            if let Some(seq) = sequence_of(&key) {
                last = last.max(Some(seq));
            }
        }
        Ok(last)
    }
}

fn log_prefix(order_id: &OrderId) -> Vec<u8> {
    let mut prefix = order_id.as_str().as_bytes().to_vec();
    prefix.push(0);
    prefix
}

fn sequence_of(key: &[u8]) -> Option<u64> {
    let tail = key.len().checked_sub(8).map(|start| &key[start..])?;
    Some(u64::from_be_bytes(tail.try_into().ok()?))
}

#[async_trait]
impl AuditStore for RocksDBAuditStore {
    async fn add_order(&self, order: Order) -> Result<(), PersistenceError> {
        let value = serde_json::to_vec(&order)?;
        self.db
            .put_cf(self.cf(CF_ORDERS)?, order.id.as_str().as_bytes(), value)?;
        Ok(())
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError> {
        match self.db.get_cf(self.cf(CF_ORDERS)?, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn all_orders(&self) -> Result<Vec<Order>, PersistenceError> {
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_ORDERS)?, IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }
        Ok(orders)
    }

    async fn add_log(&self, entry: LogEntry) -> Result<(), PersistenceError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let mut key = log_prefix(&entry.order_id);
        key.extend_from_slice(&seq.to_be_bytes());

        let value = serde_json::to_vec(&entry)?;
        self.db.put_cf(self.cf(CF_LOGS)?, key, value)?;
        Ok(())
    }

    async fn logs(&self, order_id: &OrderId) -> Result<Vec<LogEntry>, PersistenceError> {
        let prefix = log_prefix(order_id);
        let mode = IteratorMode::From(&prefix, Direction::Forward);

        let mut entries = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_LOGS)?, mode) {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            entries.push(serde_json::from_slice(&value)?);
        }
        Ok(entries)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), PersistenceError> {
        let mut order = self
            .get_order(id)
            .await?
            .ok_or_else(|| PersistenceError::OrderNotFound(id.clone()))?;
        order.status = status;
        self.add_order(order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBAuditStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_ORDERS).is_some());
        assert!(store.db.cf_handle(CF_LOGS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_order_status() {
        let dir = tempdir().unwrap();
        let store = RocksDBAuditStore::open(dir.path()).unwrap();
        let order = Order::new("o-1", "pc1zreceiver", dec!(7.5));
        let id = order.id.clone();

        store.add_order(order).await.unwrap();
        store
            .update_order_status(&id, OrderStatus::Complete)
            .await
            .unwrap();

        let stored = store.get_order(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Complete);
        assert_eq!(stored.raw_amount, dec!(7.5));
        assert_eq!(store.all_orders().await.unwrap().len(), 1);

        let missing = store
            .update_order_status(&OrderId::from("o-2"), OrderStatus::Failed)
            .await;
        assert!(matches!(missing, Err(PersistenceError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_rocksdb_logs_survive_reopen() {
        let dir = tempdir().unwrap();
        let a = OrderId::from("a");
        {
            let store = RocksDBAuditStore::open(dir.path()).unwrap();
            store.add_log(LogEntry::new(a.clone(), "PACTUS", "first")).await.unwrap();
            store
                .add_log(LogEntry::new(OrderId::from("ab"), "PACTUS", "other"))
                .await
                .unwrap();
        }

        let store = RocksDBAuditStore::open(dir.path()).unwrap();
        store
            .add_log(LogEntry::new(a.clone(), "PACTUS", "second").with_trace("tx"))
            .await
            .unwrap();

        let logs = store.logs(&a).await.unwrap();
        let descriptions: Vec<_> = logs.iter().map(|l| l.description.as_str()).collect();
        assert_eq!(descriptions, ["first", "second"]);
        assert_eq!(logs[1].trace.as_deref(), Some("tx"));
    }
}
