//! Monetary amounts using decimal arithmetic.
//!
//! All prices, fees and totals in the marketplace share one currency, so
//! `Money` is a plain decimal amount rounded to two places. It serializes as
//! a decimal string (`"12.50"`) and deserializes from either a string or a
//! JSON number, since clients send both.
//!
//! Stored amounts are `NUMERIC(10, 2)`, so anything above [`Money::MAX`] is
//! rejected up front and arithmetic is checked rather than panicking.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount does not fit the stored precision.
    #[error("amount cannot exceed {}", Money::MAX)]
    TooLarge,
}

/// A non-currency-tagged monetary amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest storable amount, `99999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(0x540B_E3FF, 2, 0, false, 2));

    /// Wrap a decimal amount, rounding to two decimal places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(2))
    }

    /// Build an amount from minor units (e.g. `1250` is `12.50`).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Parse a decimal string and require it to be a storable amount.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Invalid` for malformed input, otherwise whatever
    /// [`Money::in_range`] reports.
    pub fn parse_in_range(s: &str) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Self::new(amount).in_range()
    }

    /// Require `0 <= amount <= Money::MAX`.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` below zero and `MoneyError::TooLarge`
    /// above [`Money::MAX`].
    pub fn in_range(self) -> Result<Self, MoneyError> {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            Err(MoneyError::Negative)
        } else if self > Self::MAX {
            Err(MoneyError::TooLarge)
        } else {
            Ok(self)
        }
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity, `None` on overflow.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self::new)
    }

    /// Add two amounts, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self::new)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}
