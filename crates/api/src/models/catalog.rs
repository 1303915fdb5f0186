//! Catalog domain types: categories, restaurants, menu items, offers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use swiftbite_core::{CategoryId, MenuItemId, Money, OfferId, RestaurantId};

/// A restaurant category ("Burgers", "Coffee", ...).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// A restaurant listed in the marketplace.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Average review rating, 0.0 when unreviewed.
    pub rating: Decimal,
    pub review_count: i32,
    /// Free-text estimate such as "30-45 min".
    pub delivery_time: String,
    pub delivery_fee: Money,
    pub min_order: Money,
    pub is_open: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub section: String,
    pub is_available: bool,
    pub is_popular: bool,
}

/// Menu items sharing a section heading, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct MenuSection {
    pub name: String,
    pub items: Vec<MenuItem>,
}

impl MenuSection {
    /// Group items by section, keeping the order in which sections first appear.
    #[must_use]
    pub fn group(items: Vec<MenuItem>) -> Vec<Self> {
        let mut sections: Vec<Self> = Vec::new();
        for item in items {
            match sections.iter_mut().find(|s| s.name == item.section) {
                Some(section) => section.items.push(item),
                None => sections.push(Self {
                    name: item.section.clone(),
                    items: vec![item],
                }),
            }
        }
        sections
    }
}

/// A promotional offer shown on the home screen.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOffer {
    pub id: OfferId,
    pub restaurant_id: Option<RestaurantId>,
    pub title: String,
    pub description: Option<String>,
    pub discount_percent: i32,
    pub image_url: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, section: &str) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(id),
            restaurant_id: RestaurantId::new(1),
            name: format!("Dish {id}"),
            description: None,
            price: Money::from_minor(1000),
            image_url: None,
            section: section.to_string(),
            is_available: true,
            is_popular: false,
        }
    }

    #[test]
    fn grouping_keeps_first_seen_section_order() {
        let sections = MenuSection::group(vec![
            item(1, "Starters"),
            item(2, "Mains"),
            item(3, "Starters"),
            item(4, "Drinks"),
        ]);

        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Starters", "Mains", "Drinks"]);

        let starters: Vec<_> = sections
            .first()
            .map(|s| s.items.iter().map(|i| i.id.as_i32()).collect())
            .unwrap_or_default();
        assert_eq!(starters, [1, 3]);
    }

    #[test]
    fn grouping_empty_menu() {
        assert!(MenuSection::group(Vec::new()).is_empty());
    }
}
