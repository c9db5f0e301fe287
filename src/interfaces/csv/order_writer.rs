use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRecord<'a> {
    order_id: &'a OrderId,
    status: OrderStatus,
}

/// Writes the final status of each order as CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes a header followed by one `order_id,status` row per order.
    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderRecord {
                order_id: &order.id,
                status: order.status,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
