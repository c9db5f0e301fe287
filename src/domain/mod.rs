//! Domain layer: orders, messages, amounts and the ports the bridge talks to.

pub mod amount;
pub mod message;
pub mod order;
pub mod ports;
