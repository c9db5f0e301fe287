//! CSV input and output for the relay runner.

pub mod message_reader;
pub mod order_writer;
