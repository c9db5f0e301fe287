//! Application layer containing the settlement actor.
//!
//! [`bridge::Bridge`] consumes relay messages from a `tokio` channel, one at a
//! time, and races them against a cancellation signal.

pub mod bridge;
