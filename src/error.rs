use crate::domain::order::OrderId;
use thiserror::Error;

/// A message failed its identity or schema checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wrong destination: expected {expected}, got {actual}")]
    WrongDestination { expected: String, actual: String },
    #[error("same source and destination: {0}")]
    SameSourceAndDestination(String),
    #[error("order id is empty")]
    EmptyOrderId,
    #[error("receiver address is empty")]
    EmptyReceiver,
    #[error("order {id} is not pending: {status}")]
    NotPending { id: String, status: String },
}

/// A raw amount cannot be represented as a transfer amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("amount must be positive: {0}")]
    NotPositive(String),
    #[error("amount {0} has more than 9 decimal places")]
    TooPrecise(String),
    #[error("amount {0} is out of range")]
    OutOfRange(String),
}

/// The wallet rejected or could not complete a transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("invalid receiver address: {0}")]
    InvalidReceiver(String),
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("wallet is closed")]
    Closed,
}

/// Any audit store failure. Always fatal to the bridge loop.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("audit store unavailable")]
    Unavailable,
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PersistenceError {
    fn from(err: rocksdb::Error) -> Self {
        PersistenceError::Storage(err.to_string())
    }
}

/// Errors that terminate the bridge actor.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The audit store failed. `while_handling` keeps the domain failure that
    /// was being recorded at the time, if any.
    #[error("audit store failed for order {order_id}: {source}{}", handling_suffix(.while_handling))]
    Persistence {
        order_id: OrderId,
        #[source]
        source: PersistenceError,
        while_handling: Option<String>,
    },
    #[error("bridge inbox is closed")]
    InboxClosed,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn handling_suffix(cause: &Option<String>) -> String {
    cause
        .as_ref()
        .map(|c| format!(" (while handling: {c})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, BridgeError>;
