use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a cross-chain order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Failed,
    Complete,
}

impl OrderStatus {
    /// Returns true for statuses an order never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Failed | OrderStatus::Complete)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Complete => "COMPLETE",
        };
        f.write_str(label)
    }
}

/// A cross-chain transfer request tracked to a terminal status.
///
/// Orders are owned by the audit store. The bridge only reads the id, the
/// receiver and the raw amount, and asks the store for status transitions.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Hash of the source-chain transaction that created the order.
    #[serde(default)]
    pub tx_hash: String,
    /// Sender address on the source chain.
    #[serde(default)]
    pub sender: String,
    /// Destination address on the Pactus network.
    pub receiver: String,
    /// Amount in coins, not yet converted to the destination unit.
    pub raw_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, receiver: impl Into<String>, raw_amount: Decimal) -> Self {
        Self {
            id: id.into(),
            tx_hash: String::new(),
            sender: String::new(),
            receiver: receiver.into(),
            raw_amount,
            status: OrderStatus::Pending,
        }
    }
}

/// An immutable audit record attached to an order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct LogEntry {
    pub order_id: OrderId,
    /// Name of the relay side that wrote the entry.
    pub actor: String,
    pub description: String,
    pub trace: Option<String>,
}

impl LogEntry {
    pub fn new(order_id: OrderId, actor: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            order_id,
            actor: actor.into(),
            description: description.into(),
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}
