//! Human-facing order numbers.
//!
//! Format: `SB-YYYYMMDD-NNNNNN`, where the date is the UTC day the order was
//! placed and the suffix is a random six-digit discriminator chosen by the
//! caller. Uniqueness is enforced by the database, not by this type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Generated order number shown to customers and drivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "SB";
    /// Exclusive upper bound of the numeric suffix.
    pub const SUFFIX_SPACE: u32 = 1_000_000;

    /// Build an order number for `date` with the given discriminator.
    ///
    /// The discriminator is reduced modulo [`Self::SUFFIX_SPACE`].
    #[must_use]
    pub fn new(date: NaiveDate, discriminator: u32) -> Self {
        Self(format!(
            "{}-{}-{:06}",
            Self::PREFIX,
            date.format("%Y%m%d"),
            discriminator % Self::SUFFIX_SPACE
        ))
    }

    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_prefix_date_suffix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap_or_default();
        assert_eq!(OrderNumber::new(date, 42).as_str(), "SB-20260307-000042");
    }

    #[test]
    fn discriminator_wraps_to_six_digits() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap_or_default();
        assert_eq!(
            OrderNumber::new(date, 1_234_567).to_string(),
            "SB-20261231-234567"
        );
    }
}
