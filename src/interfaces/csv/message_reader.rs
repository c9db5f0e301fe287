use crate::domain::message::{ActorName, Message};
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::error::{BridgeError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One CSV row: `from,to,order_id,receiver,amount[,sender,tx_hash]`.
#[derive(Debug, Deserialize)]
struct MessageRecord {
    from: String,
    to: String,
    order_id: String,
    receiver: String,
    amount: Decimal,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    tx_hash: Option<String>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        let payload = Order {
            id: OrderId::from(record.order_id),
            tx_hash: record.tx_hash.unwrap_or_default(),
            sender: record.sender.unwrap_or_default(),
            receiver: record.receiver,
            raw_amount: record.amount,
            status: OrderStatus::Pending,
        };
        Message {
            from: ActorName::new(record.from),
            to: ActorName::new(record.to),
            payload,
        }
    }
}

/// Reads relay messages from a CSV source.
///
/// Handles whitespace trimming and the optional trailing columns.
pub struct MessageReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> MessageReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes messages, one `Result` per row.
    pub fn messages(self) -> impl Iterator<Item = Result<Message>> {
        self.reader
            .into_deserialize::<MessageRecord>()
            .map(|result| result.map(Message::from).map_err(BridgeError::from))
    }
}
