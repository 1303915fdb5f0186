//! Admin routes. Every handler requires the admin bearer token.
//!
//! ```text
//! GET    /api/admin/orders?status=&limit=       - Recent orders
//! GET    /api/admin/stats                       - Dashboard counters
//! GET    /api/admin/drivers                     - All drivers
//! POST   /api/admin/drivers                     - Register a driver
//! PUT    /api/admin/drivers/{id}/active         - Activate / deactivate
//! DELETE /api/admin/drivers/{id}                - Remove a driver
//! GET    /api/admin/categories                  - All categories
//! POST   /api/admin/categories                  - Create
//! PUT    /api/admin/categories/{id}             - Update
//! GET    /api/admin/restaurants                 - All restaurants
//! POST   /api/admin/restaurants                 - Create
//! PUT    /api/admin/restaurants/{id}            - Update
//! GET    /api/admin/restaurants/{id}/menu       - Full menu incl. unavailable
//! POST   /api/admin/restaurants/{id}/menu       - Add menu item
//! PUT    /api/admin/menu-items/{id}             - Update menu item
//! GET    /api/admin/offers                      - All offers
//! POST   /api/admin/offers                      - Create
//! PUT    /api/admin/offers/{id}                 - Update
//! GET    /api/admin/settings                    - Raw key/value pairs
//! PUT    /api/admin/settings/{key}              - Upsert one setting
//! ```

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use swiftbite_core::{
    CategoryId, DriverId, MenuItemId, Money, OfferId, OrderStatus, RestaurantId,
};

use crate::db::catalog::{CategoryInput, MenuItemInput, OfferInput, RestaurantInput};
use crate::db::settings::SystemSetting;
use crate::db::{
    CatalogRepository, DriverRepository, OrderRepository, RepositoryError, SettingsRepository,
};
use crate::error::{ApiJson, ApiPath, ApiQuery, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Driver, MenuItem, Order, Restaurant, SpecialOffer};
use crate::services::DriverAuthService;
use crate::services::auth::DriverRegistration;
use crate::state::AppState;

const DEFAULT_ORDER_LIMIT: i64 = 50;
const MAX_ORDER_LIMIT: i64 = 200;

/// Admin router, nested under `/api/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/stats", get(stats))
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/{id}", axum::routing::delete(delete_driver))
        .route("/drivers/{id}/active", put(set_driver_active))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route("/restaurants/{id}", put(update_restaurant))
        .route("/restaurants/{id}/menu", get(restaurant_menu).post(create_menu_item))
        .route("/menu-items/{id}", put(update_menu_item))
        .route("/offers", get(list_offers).post(create_offer))
        .route("/offers/{id}", put(update_offer))
        .route("/settings", get(list_settings))
        .route("/settings/{key}", put(put_setting))
}

fn missing_as(err: RepositoryError, what: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("{what} not found")),
        other => other.into(),
    }
}

fn require_text(value: Option<&str>, field: &str) -> Result<()> {
    if value.is_some_and(|v| !v.trim().is_empty()) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{field} is required")))
    }
}

fn reject_blank(value: Option<&str>, field: &str) -> Result<()> {
    if value.is_some_and(|v| v.trim().is_empty()) {
        Err(AppError::BadRequest(format!("{field} cannot be blank")))
    } else {
        Ok(())
    }
}

fn check_price(price: Option<Money>, field: &str) -> Result<()> {
    match price.map(Money::in_range) {
        Some(Err(e)) => Err(AppError::BadRequest(format!("{field}: {e}"))),
        _ => Ok(()),
    }
}

fn check_discount(discount: Option<i32>) -> Result<()> {
    match discount {
        Some(d) if !(0..=100).contains(&d) => Err(AppError::BadRequest(
            "discountPercent must be between 0 and 100".to_string(),
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// Orders & dashboard
// =============================================================================

/// Query for `GET /api/admin/orders`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

/// Dashboard counters.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Every status is present, zero when no order has it.
    pub orders_by_status: BTreeMap<&'static str, i64>,
    pub today_orders: i64,
    pub today_revenue: Money,
    pub available_drivers: i64,
}

async fn list_orders(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ORDER_LIMIT)
        .clamp(1, MAX_ORDER_LIMIT);
    let orders = OrderRepository::new(state.pool())
        .list_recent(query.status, limit)
        .await?;
    Ok(Json(orders))
}

async fn stats(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let stats = OrderRepository::new(state.pool()).stats().await?;
    let available_drivers = DriverRepository::new(state.pool()).count_available().await?;

    let mut orders_by_status: BTreeMap<&'static str, i64> =
        OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for (status, count) in stats.by_status {
        orders_by_status.insert(status.as_str(), count);
    }

    Ok(Json(DashboardStats {
        orders_by_status,
        today_orders: stats.today_orders,
        today_revenue: stats.today_revenue,
        available_drivers,
    }))
}

// =============================================================================
// Drivers
// =============================================================================

/// Body of `POST /api/admin/drivers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password: String,
    pub vehicle_type: Option<String>,
}

/// Body of `PUT /api/admin/drivers/{id}/active`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRequest {
    pub is_active: bool,
}

async fn list_drivers(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<Vec<Driver>>> {
    Ok(Json(DriverRepository::new(state.pool()).list_all().await?))
}

async fn create_driver(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateDriverRequest>,
) -> Result<(StatusCode, Json<Driver>)> {
    let driver = DriverAuthService::new(state.pool())
        .register(&DriverRegistration {
            name: request.name,
            phone: request.phone,
            email: request.email,
            password: request.password,
            vehicle_type: request.vehicle_type,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

async fn set_driver_active(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
    ApiJson(request): ApiJson<ActiveRequest>,
) -> Result<Json<Driver>> {
    let driver = DriverRepository::new(state.pool())
        .set_active(id, request.is_active)
        .await
        .map_err(|e| missing_as(e, "Driver"))?;
    tracing::info!(driver_id = %id, is_active = driver.is_active, "Driver activation changed");
    Ok(Json(driver))
}

async fn delete_driver(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<StatusCode> {
    DriverRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| missing_as(e, "Driver"))?;
    tracing::info!(driver_id = %id, "Driver deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_categories(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_categories(true).await?))
}

async fn create_category(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    require_text(input.name.as_deref(), "name")?;
    let category = CatalogRepository::new(state.pool())
        .create_category(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Category>> {
    reject_blank(input.name.as_deref(), "name")?;
    CatalogRepository::new(state.pool())
        .update_category(id, &input)
        .await
        .map(Json)
        .map_err(|e| missing_as(e, "Category"))
}

async fn list_restaurants(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Restaurant>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_all_restaurants().await?))
}

async fn create_restaurant(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RestaurantInput>,
) -> Result<(StatusCode, Json<Restaurant>)> {
    require_text(input.name.as_deref(), "name")?;
    check_price(input.delivery_fee, "deliveryFee")?;
    check_price(input.min_order, "minOrder")?;
    let restaurant = CatalogRepository::new(state.pool())
        .create_restaurant(&input)
        .await?;
    tracing::info!(restaurant_id = %restaurant.id, "Restaurant created");
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn update_restaurant(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RestaurantId>,
    ApiJson(input): ApiJson<RestaurantInput>,
) -> Result<Json<Restaurant>> {
    reject_blank(input.name.as_deref(), "name")?;
    check_price(input.delivery_fee, "deliveryFee")?;
    check_price(input.min_order, "minOrder")?;
    CatalogRepository::new(state.pool())
        .update_restaurant(id, &input)
        .await
        .map(Json)
        .map_err(|e| missing_as(e, "Restaurant"))
}

async fn restaurant_menu(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RestaurantId>,
) -> Result<Json<Vec<MenuItem>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_menu(id, true).await?))
}

async fn create_menu_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RestaurantId>,
    ApiJson(input): ApiJson<MenuItemInput>,
) -> Result<(StatusCode, Json<MenuItem>)> {
    require_text(input.name.as_deref(), "name")?;
    if input.price.is_none() {
        return Err(AppError::BadRequest("price is required".to_string()));
    }
    check_price(input.price, "price")?;
    let item = CatalogRepository::new(state.pool())
        .create_menu_item(id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_menu_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MenuItemId>,
    ApiJson(input): ApiJson<MenuItemInput>,
) -> Result<Json<MenuItem>> {
    reject_blank(input.name.as_deref(), "name")?;
    check_price(input.price, "price")?;
    CatalogRepository::new(state.pool())
        .update_menu_item(id, &input)
        .await
        .map(Json)
        .map_err(|e| missing_as(e, "Menu item"))
}

async fn list_offers(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<SpecialOffer>>> {
    Ok(Json(CatalogRepository::new(state.pool()).list_all_offers().await?))
}

async fn create_offer(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OfferInput>,
) -> Result<(StatusCode, Json<SpecialOffer>)> {
    require_text(input.title.as_deref(), "title")?;
    check_discount(input.discount_percent)?;
    let offer = CatalogRepository::new(state.pool()).create_offer(&input).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn update_offer(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OfferId>,
    ApiJson(input): ApiJson<OfferInput>,
) -> Result<Json<SpecialOffer>> {
    reject_blank(input.title.as_deref(), "title")?;
    check_discount(input.discount_percent)?;
    CatalogRepository::new(state.pool())
        .update_offer(id, &input)
        .await
        .map(Json)
        .map_err(|e| missing_as(e, "Offer"))
}

// =============================================================================
// Settings
// =============================================================================

/// Body of `PUT /api/admin/settings/{key}`.
#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

async fn list_settings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<SystemSetting>>> {
    Ok(Json(SettingsRepository::new(state.pool()).list().await?))
}

async fn put_setting(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
    ApiJson(body): ApiJson<SettingValue>,
) -> Result<Json<SystemSetting>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::BadRequest("setting key is required".to_string()));
    }

    let setting = SettingsRepository::new(state.pool())
        .upsert(key, &body.value)
        .await?;
    state.settings().invalidate().await;

    tracing::info!(key = %setting.key, "Setting updated");
    Ok(Json(setting))
}
