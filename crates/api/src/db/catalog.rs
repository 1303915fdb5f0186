//! Catalog repository: categories, restaurants, menu items and offers.
//!
//! Nothing in the catalog is hard-deleted. Admins hide entries by clearing
//! `is_active`, `is_open` or `is_available`.

use serde::Deserialize;
use sqlx::PgPool;

use swiftbite_core::{CategoryId, MenuItemId, Money, OfferId, RestaurantId};

use super::RepositoryError;
use crate::models::{Category, MenuItem, Restaurant, SpecialOffer};

const CATEGORY_COLUMNS: &str = "id, name, icon, sort_order, is_active";

const RESTAURANT_COLUMNS: &str = "id, category_id, name, description, image_url, address, phone, \
     rating, review_count, delivery_time, delivery_fee, min_order, is_open, is_active, \
     created_at, updated_at";

const MENU_ITEM_COLUMNS: &str =
    "id, restaurant_id, name, description, price, image_url, section, is_available, is_popular";

const OFFER_COLUMNS: &str =
    "id, restaurant_id, title, description, discount_percent, image_url, valid_until, is_active";

// =============================================================================
// Inputs
// =============================================================================

/// Filters for the public restaurant listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    #[serde(default)]
    pub open_only: bool,
}

/// Category fields. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Restaurant fields. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInput {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_fee: Option<Money>,
    pub min_order: Option<Money>,
    pub is_open: Option<bool>,
    pub is_active: Option<bool>,
}

/// Menu item fields. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub image_url: Option<String>,
    pub section: Option<String>,
    pub is_available: Option<bool>,
    pub is_popular: Option<bool>,
}

/// Special offer fields. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub restaurant_id: Option<RestaurantId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub image_url: Option<String>,
    pub valid_until: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: Option<bool>,
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// List categories by sort order. Inactive ones are included only when asked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            r"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE is_active OR $1
            ORDER BY sort_order, name
            "
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Create a category. `name` is required.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r"
            INSERT INTO categories (name, icon, sort_order, is_active)
            VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, TRUE))
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(input.name.as_deref().unwrap_or_default())
        .bind(input.icon.as_deref())
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r"
            UPDATE categories
            SET name = COALESCE($2, name),
                icon = COALESCE($3, icon),
                sort_order = COALESCE($4, sort_order),
                is_active = COALESCE($5, is_active)
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.icon.as_deref())
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row)
    }

    // -------------------------------------------------------------------------
    // Restaurants
    // -------------------------------------------------------------------------

    /// List active restaurants, best rated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_restaurants(
        &self,
        filter: &RestaurantFilter,
    ) -> Result<Vec<Restaurant>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, Restaurant>(&format!(
            r"
            SELECT {RESTAURANT_COLUMNS}
            FROM restaurants
            WHERE is_active
              AND ($1::INTEGER IS NULL OR category_id = $1)
              AND ($2::TEXT IS NULL OR name ILIKE $2)
              AND (NOT $3 OR is_open)
            ORDER BY rating DESC, name
            "
        ))
        .bind(filter.category_id)
        .bind(search)
        .bind(filter.open_only)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// List every restaurant including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_restaurants(&self) -> Result<Vec<Restaurant>, RepositoryError> {
        let rows = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a restaurant by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Create a restaurant. `name` is required.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `category_id` doesn't exist.
    pub async fn create_restaurant(
        &self,
        input: &RestaurantInput,
    ) -> Result<Restaurant, RepositoryError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            r"
            INSERT INTO restaurants (
                category_id, name, description, image_url, address, phone,
                delivery_time, delivery_fee, min_order, is_open, is_active
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, '30-45 min'), COALESCE($8, 0), COALESCE($9, 0),
                COALESCE($10, TRUE), COALESCE($11, TRUE)
            )
            RETURNING {RESTAURANT_COLUMNS}
            "
        ))
        .bind(input.category_id)
        .bind(input.name.as_deref().unwrap_or_default())
        .bind(input.description.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.address.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.delivery_time.as_deref())
        .bind(input.delivery_fee)
        .bind(input.min_order)
        .bind(input.is_open)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Update a restaurant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the restaurant doesn't exist.
    pub async fn update_restaurant(
        &self,
        id: RestaurantId,
        input: &RestaurantInput,
    ) -> Result<Restaurant, RepositoryError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            r"
            UPDATE restaurants
            SET category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                address = COALESCE($6, address),
                phone = COALESCE($7, phone),
                delivery_time = COALESCE($8, delivery_time),
                delivery_fee = COALESCE($9, delivery_fee),
                min_order = COALESCE($10, min_order),
                is_open = COALESCE($11, is_open),
                is_active = COALESCE($12, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {RESTAURANT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.category_id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.image_url.as_deref())
        .bind(input.address.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.delivery_time.as_deref())
        .bind(input.delivery_fee)
        .bind(input.min_order)
        .bind(input.is_open)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row)
    }

    // -------------------------------------------------------------------------
    // Menu items
    // -------------------------------------------------------------------------

    /// List a restaurant's menu in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_menu(
        &self,
        restaurant_id: RestaurantId,
        include_unavailable: bool,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuItem>(&format!(
            r"
            SELECT {MENU_ITEM_COLUMNS}
            FROM menu_items
            WHERE restaurant_id = $1 AND (is_available OR $2)
            ORDER BY section, is_popular DESC, name
            "
        ))
        .bind(restaurant_id)
        .bind(include_unavailable)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Add a menu item. `name` and `price` are required.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the restaurant doesn't exist.
    pub async fn create_menu_item(
        &self,
        restaurant_id: RestaurantId,
        input: &MenuItemInput,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItem>(&format!(
            r"
            INSERT INTO menu_items (
                restaurant_id, name, description, price, image_url, section,
                is_available, is_popular
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'Main'), COALESCE($7, TRUE), COALESCE($8, FALSE))
            RETURNING {MENU_ITEM_COLUMNS}
            "
        ))
        .bind(restaurant_id)
        .bind(input.name.as_deref().unwrap_or_default())
        .bind(input.description.as_deref())
        .bind(input.price.unwrap_or_default())
        .bind(input.image_url.as_deref())
        .bind(input.section.as_deref())
        .bind(input.is_available)
        .bind(input.is_popular)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Update a menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        input: &MenuItemInput,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItem>(&format!(
            r"
            UPDATE menu_items
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                image_url = COALESCE($5, image_url),
                section = COALESCE($6, section),
                is_available = COALESCE($7, is_available),
                is_popular = COALESCE($8, is_popular),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MENU_ITEM_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.image_url.as_deref())
        .bind(input.section.as_deref())
        .bind(input.is_available)
        .bind(input.is_popular)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row)
    }

    // -------------------------------------------------------------------------
    // Offers
    // -------------------------------------------------------------------------

    /// List offers that are active and not past `valid_until`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_current_offers(&self) -> Result<Vec<SpecialOffer>, RepositoryError> {
        let rows = sqlx::query_as::<_, SpecialOffer>(&format!(
            r"
            SELECT {OFFER_COLUMNS}
            FROM special_offers
            WHERE is_active AND (valid_until IS NULL OR valid_until > NOW())
            ORDER BY discount_percent DESC, id
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// List every offer including expired and inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all_offers(&self) -> Result<Vec<SpecialOffer>, RepositoryError> {
        let rows = sqlx::query_as::<_, SpecialOffer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM special_offers ORDER BY id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Create an offer. `title` is required.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `restaurant_id` doesn't exist.
    pub async fn create_offer(&self, input: &OfferInput) -> Result<SpecialOffer, RepositoryError> {
        let row = sqlx::query_as::<_, SpecialOffer>(&format!(
            r"
            INSERT INTO special_offers (
                restaurant_id, title, description, discount_percent, image_url,
                valid_until, is_active
            )
            VALUES ($1, $2, $3, COALESCE($4, 0), $5, $6, COALESCE($7, TRUE))
            RETURNING {OFFER_COLUMNS}
            "
        ))
        .bind(input.restaurant_id)
        .bind(input.title.as_deref().unwrap_or_default())
        .bind(input.description.as_deref())
        .bind(input.discount_percent)
        .bind(input.image_url.as_deref())
        .bind(input.valid_until)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Update an offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the offer doesn't exist.
    pub async fn update_offer(
        &self,
        id: OfferId,
        input: &OfferInput,
    ) -> Result<SpecialOffer, RepositoryError> {
        let row = sqlx::query_as::<_, SpecialOffer>(&format!(
            r"
            UPDATE special_offers
            SET restaurant_id = COALESCE($2, restaurant_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                discount_percent = COALESCE($5, discount_percent),
                image_url = COALESCE($6, image_url),
                valid_until = COALESCE($7, valid_until),
                is_active = COALESCE($8, is_active)
            WHERE id = $1
            RETURNING {OFFER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.restaurant_id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.discount_percent)
        .bind(input.image_url.as_deref())
        .bind(input.valid_until)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("pizza"), "%pizza%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn restaurant_filter_from_query_names() {
        let filter: RestaurantFilter =
            serde_json::from_str(r#"{"categoryId": 3, "search": "taco", "openOnly": true}"#)
                .unwrap();
        assert_eq!(filter.category_id, Some(CategoryId::new(3)));
        assert_eq!(filter.search.as_deref(), Some("taco"));
        assert!(filter.open_only);
    }
}
