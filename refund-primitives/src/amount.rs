//! Monetary amounts.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Non-negative amount expressed in the merchant's smallest currency unit.
///
/// Refund requests carry strictly positive amounts (see [`Amount::positive`]);
/// policy thresholds may be zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw amount.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Wraps a raw amount, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAmount`] when `value` is zero.
    pub fn positive(value: u64) -> Result<Self> {
        if value == 0 {
            return Err(Error::InvalidAmount {
                amount: value,
                reason: "refund amount must be greater than zero",
            });
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for the zero amount.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for Amount {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| Error::NegativeAmount { amount: value })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero() {
        assert!(Amount::positive(0).is_err());
        assert_eq!(Amount::positive(150).unwrap().get(), 150);
    }

    #[test]
    fn negative_signed_values_are_rejected() {
        let err = Amount::try_from(-25_i64).unwrap_err();
        assert_eq!(err, Error::NegativeAmount { amount: -25 });
        assert_eq!(err.to_string(), "invalid amount -25: amount cannot be negative");
        assert_eq!(Amount::try_from(200_i64).unwrap(), Amount::new(200));
    }

    #[test]
    fn ordering_follows_value() {
        assert!(Amount::new(200) <= Amount::new(200));
        assert!(Amount::new(201) > Amount::new(200));
    }
}
