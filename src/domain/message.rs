use super::order::{Order, OrderStatus};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one relay side, e.g. `PACTUS` or `POLYGON`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorName(String);

impl ActorName {
    pub const PACTUS: &'static str = "PACTUS";

    /// Names are case-insensitive and stored upper-case.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_uppercase())
    }

    pub fn pactus() -> Self {
        Self::new(Self::PACTUS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Envelope carrying an order between relay sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub from: ActorName,
    pub to: ActorName,
    pub payload: Order,
}

impl Message {
    pub fn new(from: impl Into<ActorName>, to: impl Into<ActorName>, payload: Order) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            payload,
        }
    }

    /// Checks that this message is addressed to `actor` and carries a
    /// processable order.
    pub fn validate(&self, actor: &ActorName) -> Result<(), ValidationError> {
        if &self.to != actor {
            return Err(ValidationError::WrongDestination {
                expected: actor.to_string(),
                actual: self.to.to_string(),
            });
        }
        if self.from == self.to {
            return Err(ValidationError::SameSourceAndDestination(
                self.to.to_string(),
            ));
        }

        let order = &self.payload;
        if order.id.is_empty() {
            return Err(ValidationError::EmptyOrderId);
        }
        if order.receiver.trim().is_empty() {
            return Err(ValidationError::EmptyReceiver);
        }
        if order.status != OrderStatus::Pending {
            return Err(ValidationError::NotPending {
                id: order.id.to_string(),
                status: order.status.to_string(),
            });
        }

        Ok(())
    }

    /// Memo attached to the destination transfer.
    pub fn memo(&self) -> String {
        format!("bridge from {} to {} by wrapto.app", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn message(from: &str, to: &str) -> Message {
        Message::new(from, to, Order::new("o-1", "pc1zreceiver", dec!(10)))
    }

    #[test]
    fn test_valid_message() {
        let msg = message("POLYGON", "PACTUS");
        assert_eq!(msg.validate(&ActorName::pactus()), Ok(()));
    }

    #[test]
    fn test_wrong_destination() {
        let msg = message("PACTUS", "POLYGON");
        let err = msg.validate(&ActorName::pactus()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong destination: expected PACTUS, got POLYGON"
        );
    }

    #[test]
    fn test_same_source_and_destination() {
        let msg = message("PACTUS", "PACTUS");
        assert_eq!(
            msg.validate(&ActorName::pactus()),
            Err(ValidationError::SameSourceAndDestination("PACTUS".into()))
        );
    }

    #[test]
    fn test_empty_receiver() {
        let mut msg = message("POLYGON", "PACTUS");
        msg.payload.receiver = " ".to_string();
        assert_eq!(
            msg.validate(&ActorName::pactus()),
            Err(ValidationError::EmptyReceiver)
        );
    }

    #[test]
    fn test_already_processed_order() {
        let mut msg = message("POLYGON", "PACTUS");
        msg.payload.status = OrderStatus::Complete;
        let err = msg.validate(&ActorName::pactus()).unwrap_err();
        assert_eq!(err.to_string(), "order o-1 is not pending: COMPLETE");
    }

    #[test]
    fn test_actor_names_are_case_insensitive() {
        assert_eq!(ActorName::from("pactus"), ActorName::pactus());
    }

    #[test]
    fn test_memo_literal() {
        let msg = Message::new("A", "B", Order::new("o-1", "pc1z", dec!(1)));
        assert_eq!(msg.memo(), "bridge from A to B by wrapto.app");
    }
}
