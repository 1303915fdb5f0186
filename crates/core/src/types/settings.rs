//! Typed view over the `system_settings` key/value store.
//!
//! Settings are persisted as plain strings so staff can add flags without a
//! migration. [`UiSettings`] is the typed projection: it is resolved once per
//! request (or once per CLI session) and passed explicitly to whatever needs
//! it, instead of being read from ambient global state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Well-known setting keys.
pub mod setting_keys {
    pub const SHOW_SPECIAL_OFFERS: &str = "show_special_offers";
    pub const SHOW_REVIEWS: &str = "show_reviews";
    pub const SHOW_CATEGORIES: &str = "show_categories";
    pub const ACCEPT_ORDERS: &str = "accept_orders";
    pub const ALLOW_CASH_PAYMENT: &str = "allow_cash_payment";
    pub const DEFAULT_DELIVERY_FEE: &str = "default_delivery_fee";
    pub const SUPPORT_PHONE: &str = "support_phone";

    /// Every key with a typed field on `UiSettings`.
    pub const KNOWN: [&str; 7] = [
        SHOW_SPECIAL_OFFERS,
        SHOW_REVIEWS,
        SHOW_CATEGORIES,
        ACCEPT_ORDERS,
        ALLOW_CASH_PAYMENT,
        DEFAULT_DELIVERY_FEE,
        SUPPORT_PHONE,
    ];
}

/// Resolved UI settings and feature flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    pub show_special_offers: bool,
    pub show_reviews: bool,
    pub show_categories: bool,
    /// When false, order creation is refused.
    pub accept_orders: bool,
    pub allow_cash_payment: bool,
    /// Fee applied when an order does not carry one.
    pub default_delivery_fee: Money,
    pub support_phone: Option<String>,
    /// Settings without a typed field, passed through untouched.
    pub extra: BTreeMap<String, String>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_special_offers: true,
            show_reviews: true,
            show_categories: true,
            accept_orders: true,
            allow_cash_payment: true,
            default_delivery_fee: Money::ZERO,
            support_phone: None,
            extra: BTreeMap::new(),
        }
    }
}

impl UiSettings {
    /// Build settings from stored key/value pairs.
    ///
    /// Missing keys and values that fail to parse keep their defaults.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match key {
                setting_keys::SHOW_SPECIAL_OFFERS => {
                    set_flag(&mut settings.show_special_offers, value);
                }
                setting_keys::SHOW_REVIEWS => set_flag(&mut settings.show_reviews, value),
                setting_keys::SHOW_CATEGORIES => set_flag(&mut settings.show_categories, value),
                setting_keys::ACCEPT_ORDERS => set_flag(&mut settings.accept_orders, value),
                setting_keys::ALLOW_CASH_PAYMENT => {
                    set_flag(&mut settings.allow_cash_payment, value);
                }
                setting_keys::DEFAULT_DELIVERY_FEE => {
                    if let Ok(fee) = Money::parse_in_range(value) {
                        settings.default_delivery_fee = fee;
                    }
                }
                setting_keys::SUPPORT_PHONE => {
                    settings.support_phone = (!value.is_empty()).then(|| value.to_string());
                }
                other => {
                    settings.extra.insert(other.to_string(), value.to_string());
                }
            }
        }
        settings
    }

    /// Look up a flag by key, typed or not.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            setting_keys::SHOW_SPECIAL_OFFERS => Some(self.show_special_offers),
            setting_keys::SHOW_REVIEWS => Some(self.show_reviews),
            setting_keys::SHOW_CATEGORIES => Some(self.show_categories),
            setting_keys::ACCEPT_ORDERS => Some(self.accept_orders),
            setting_keys::ALLOW_CASH_PAYMENT => Some(self.allow_cash_payment),
            other => self.extra.get(other).and_then(|v| parse_flag(v)),
        }
    }
}

fn set_flag(slot: &mut bool, value: &str) {
    if let Some(flag) = parse_flag(value) {
        *slot = flag;
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_gives_defaults() {
        let settings = UiSettings::from_pairs(Vec::<(String, String)>::new());
        assert_eq!(settings, UiSettings::default());
        assert!(settings.accept_orders);
    }

    #[test]
    fn typed_keys_are_parsed() {
        let settings = UiSettings::from_pairs([
            ("show_reviews", "false"),
            ("accept_orders", "OFF"),
            ("default_delivery_fee", "7.5"),
            ("support_phone", " +966500000000 "),
        ]);
        assert!(!settings.show_reviews);
        assert!(!settings.accept_orders);
        assert_eq!(settings.default_delivery_fee, Money::from_minor(750));
        assert_eq!(settings.support_phone.as_deref(), Some("+966500000000"));
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let settings = UiSettings::from_pairs([
            ("show_categories", "maybe"),
            ("default_delivery_fee", "-3"),
        ]);
        assert!(settings.show_categories);
        assert_eq!(settings.default_delivery_fee, Money::ZERO);
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let settings = UiSettings::from_pairs([("show_banner", "yes")]);
        assert_eq!(settings.extra.get("show_banner").map(String::as_str), Some("yes"));
        assert_eq!(settings.flag("show_banner"), Some(true));
        assert_eq!(settings.flag("missing"), None);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(UiSettings::default()).unwrap_or_default();
        assert_eq!(json["acceptOrders"], serde_json::Value::Bool(true));
        assert_eq!(json["defaultDeliveryFee"], serde_json::json!("0"));
    }
}
