//! Order line items.
//!
//! Orders keep their items as a denormalized list of `{name, price, quantity}`
//! snapshots rather than references to menu rows, so later menu edits never
//! rewrite order history. Clients may send the list as a JSON array or as a
//! string containing that array; both decode to [`LineItems`].

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::money::{Money, MoneyError};

/// Errors from decoding or validating line items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The encoded string is not a JSON array of items.
    #[error("items must be a JSON array of {{name, price, quantity}}: {0}")]
    Malformed(String),
    /// No items at all.
    #[error("order must contain at least one item")]
    Empty,
    /// An item has a blank name.
    #[error("item {index} has no name")]
    MissingName {
        /// Zero-based position in the list.
        index: usize,
    },
    /// An item has quantity zero.
    #[error("item '{name}' must have a quantity of at least 1")]
    ZeroQuantity {
        /// Item name.
        name: String,
    },
    /// An item has a negative price.
    #[error("item '{name}' has a negative price")]
    NegativePrice {
        /// Item name.
        name: String,
    },
    /// An item's unit price is above [`Money::MAX`].
    #[error("item '{name}' has a price above {}", Money::MAX)]
    PriceTooLarge {
        /// Item name.
        name: String,
    },
    /// Line totals add up to more than [`Money::MAX`].
    #[error("items add up to more than {}", Money::MAX)]
    AmountTooLarge,
}

/// A single ordered item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: Money,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Price times quantity, `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_times(self.quantity)
    }
}

/// The item list of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    /// Wrap a list without validating it.
    #[must_use]
    pub const fn new(items: Vec<LineItem>) -> Self {
        Self(items)
    }

    /// Decode the string-encoded form (`"[{\"name\":...}]"`).
    ///
    /// # Errors
    ///
    /// Returns `LineItemError::Malformed` if the string is not a JSON array of items.
    pub fn from_encoded(encoded: &str) -> Result<Self, LineItemError> {
        serde_json::from_str::<Vec<LineItem>>(encoded)
            .map(Self)
            .map_err(|e| LineItemError::Malformed(e.to_string()))
    }

    /// Check that the list is non-empty and every item is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), LineItemError> {
        if self.0.is_empty() {
            return Err(LineItemError::Empty);
        }
        for (index, item) in self.0.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(LineItemError::MissingName { index });
            }
            if item.quantity == 0 {
                return Err(LineItemError::ZeroQuantity {
                    name: item.name.clone(),
                });
            }
            match item.price.in_range() {
                Ok(_) | Err(MoneyError::Invalid(_)) => {}
                Err(MoneyError::Negative) => {
                    return Err(LineItemError::NegativePrice {
                        name: item.name.clone(),
                    });
                }
                Err(MoneyError::TooLarge) => {
                    return Err(LineItemError::PriceTooLarge {
                        name: item.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Sum of every line total.
    ///
    /// # Errors
    ///
    /// Returns `LineItemError::AmountTooLarge` if the sum overflows or is
    /// above [`Money::MAX`].
    pub fn subtotal(&self) -> Result<Money, LineItemError> {
        self.0
            .iter()
            .try_fold(Money::ZERO, |acc, item| {
                item.line_total().and_then(|line| acc.checked_add(line))
            })
            .and_then(|total| total.in_range().ok())
            .ok_or(LineItemError::AmountTooLarge)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.0
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }

    /// Borrow the items.
    #[must_use]
    pub fn as_slice(&self) -> &[LineItem] {
        &self.0
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<LineItem>> for LineItems {
    fn from(items: Vec<LineItem>) -> Self {
        Self(items)
    }
}

impl<'de> Deserialize<'de> for LineItems {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ItemsVisitor;

        impl<'de> Visitor<'de> for ItemsVisitor {
            type Value = LineItems;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an array of items or a string containing one")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                LineItems::from_encoded(v).map_err(E::custom)
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<LineItem>()? {
                    items.push(item);
                }
                Ok(LineItems(items))
            }
        }

        deserializer.deserialize_any(ItemsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, minor: i64, quantity: u32) -> LineItem {
        LineItem {
            name: name.to_string(),
            price: Money::from_minor(minor),
            quantity,
        }
    }

    #[test]
    fn accepts_array_and_encoded_string() {
        let from_array: LineItems =
            serde_json::from_str(r#"[{"name":"Shawarma","price":"12.50","quantity":2}]"#)
                .unwrap_or_default();
        let from_string: LineItems = serde_json::from_str(
            r#""[{\"name\":\"Shawarma\",\"price\":12.5,\"quantity\":2}]""#,
        )
        .unwrap_or_default();

        assert_eq!(from_array.len(), 1);
        assert_eq!(from_array, from_string);
    }

    #[test]
    fn malformed_string_is_rejected() {
        assert!(serde_json::from_str::<LineItems>(r#""not json""#).is_err());
        assert!(matches!(
            LineItems::from_encoded("{\"name\":\"x\"}"),
            Err(LineItemError::Malformed(_))
        ));
    }

    #[test]
    fn quantity_defaults_to_one() {
        let items = LineItems::from_encoded(r#"[{"name":"Tea","price":"2"}]"#).unwrap_or_default();
        assert_eq!(items.unit_count(), 1);
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let items = LineItems::new(vec![item("Burger", 2500, 2), item("Fries", 750, 1)]);
        assert_eq!(items.subtotal(), Ok(Money::from_minor(5750)));
        assert_eq!(items.unit_count(), 3);
    }

    #[test]
    fn validation_catches_each_problem() {
        assert_eq!(LineItems::default().validate(), Err(LineItemError::Empty));
        assert_eq!(
            LineItems::new(vec![item(" ", 100, 1)]).validate(),
            Err(LineItemError::MissingName { index: 0 })
        );
        assert!(matches!(
            LineItems::new(vec![item("Soup", 100, 0)]).validate(),
            Err(LineItemError::ZeroQuantity { .. })
        ));
        assert!(matches!(
            LineItems::new(vec![item("Soup", -100, 1)]).validate(),
            Err(LineItemError::NegativePrice { .. })
        ));
        assert!(matches!(
            LineItems::new(vec![item("Soup", 10_000_000_000, 1)]).validate(),
            Err(LineItemError::PriceTooLarge { .. })
        ));
        assert!(LineItems::new(vec![item("Soup", 100, 1)]).validate().is_ok());
    }

    #[test]
    fn decimal_max_price_is_an_error_not_a_panic() {
        let items: LineItems = serde_json::from_str(
            r#"[{"name":"Platter","price":"79228162514264337593543950335","quantity":2}]"#,
        )
        .unwrap_or_default();
        assert_eq!(items.len(), 1);
        assert!(matches!(
            items.validate(),
            Err(LineItemError::PriceTooLarge { .. })
        ));
        assert_eq!(items.subtotal(), Err(LineItemError::AmountTooLarge));
    }

    #[test]
    fn subtotal_above_storage_limit_is_rejected() {
        let items = LineItems::new(vec![item("Feast", 9_000_000_000, 2)]);
        assert!(items.validate().is_ok());
        assert_eq!(items.subtotal(), Err(LineItemError::AmountTooLarge));
    }

    #[test]
    fn unit_count_saturates() {
        let items = LineItems::new(vec![item("Tea", 100, u32::MAX), item("Cake", 100, 5)]);
        assert_eq!(items.unit_count(), u32::MAX);
    }
}
