use crate::error::ConversionError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of nanoPAC in one PAC.
pub const NANO_PER_COIN: i64 = 1_000_000_000;

/// Decimal places carried by a PAC amount.
const COIN_SCALE: u32 = 9;

/// A validated transfer amount, held in nanoPAC.
///
/// Always strictly positive. Built from a raw coin value with
/// `Amount::try_from(Decimal)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn from_nano(nano: i64) -> Result<Self, ConversionError> {
        if nano > 0 {
            Ok(Self(nano))
        } else {
            Err(ConversionError::NotPositive(nano.to_string()))
        }
    }

    pub fn as_nano(&self) -> i64 {
        self.0
    }

    /// Amount expressed in coins.
    pub fn to_coins(&self) -> Decimal {
        Decimal::new(self.0, COIN_SCALE).normalize()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ConversionError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let raw = value.normalize();
        if raw <= Decimal::ZERO {
            return Err(ConversionError::NotPositive(raw.to_string()));
        }
        if raw.scale() > COIN_SCALE {
            return Err(ConversionError::TooPrecise(raw.to_string()));
        }

        let nano = raw
            .checked_mul(Decimal::from(NANO_PER_COIN))
            .and_then(|n| i64::try_from(n).ok())
            .ok_or_else(|| ConversionError::OutOfRange(raw.to_string()))?;

        Self::from_nano(nano)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} PAC", self.to_coins())
    }
}
