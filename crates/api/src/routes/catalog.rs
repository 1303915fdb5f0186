//! Public catalog routes.

use axum::{Json, extract::State};
use serde::Deserialize;

use swiftbite_core::{RestaurantId, UiSettings};

use crate::db::catalog::RestaurantFilter;
use crate::db::{CatalogRepository, ReviewRepository};
use crate::error::{ApiPath, ApiQuery, AppError, Result};
use crate::models::{Category, MenuSection, Restaurant, Review, SpecialOffer};
use crate::services::ResolvedSettings;
use crate::state::AppState;

const DEFAULT_REVIEW_LIMIT: i64 = 20;
const MAX_REVIEW_LIMIT: i64 = 100;

/// Query for restaurant reviews.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub limit: Option<i64>,
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CatalogRepository::new(state.pool())
        .list_categories(false)
        .await?;
    Ok(Json(categories))
}

/// `GET /api/restaurants`
pub async fn list_restaurants(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<RestaurantFilter>,
) -> Result<Json<Vec<Restaurant>>> {
    let restaurants = CatalogRepository::new(state.pool())
        .list_restaurants(&filter)
        .await?;
    Ok(Json(restaurants))
}

async fn active_restaurant(state: &AppState, id: RestaurantId) -> Result<Restaurant> {
    CatalogRepository::new(state.pool())
        .get_restaurant(id)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
}

/// `GET /api/restaurants/{id}`
pub async fn show_restaurant(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RestaurantId>,
) -> Result<Json<Restaurant>> {
    Ok(Json(active_restaurant(&state, id).await?))
}

/// `GET /api/restaurants/{id}/menu`
///
/// Available items only, grouped by section.
pub async fn restaurant_menu(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RestaurantId>,
) -> Result<Json<Vec<MenuSection>>> {
    active_restaurant(&state, id).await?;
    let items = CatalogRepository::new(state.pool())
        .list_menu(id, false)
        .await?;
    Ok(Json(MenuSection::group(items)))
}

/// `GET /api/restaurants/{id}/reviews`
pub async fn restaurant_reviews(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RestaurantId>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> Result<Json<Vec<Review>>> {
    active_restaurant(&state, id).await?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_REVIEW_LIMIT)
        .clamp(1, MAX_REVIEW_LIMIT);
    let reviews = ReviewRepository::new(state.pool())
        .list_for_restaurant(id, limit)
        .await?;
    Ok(Json(reviews))
}

/// `GET /api/offers`
pub async fn list_offers(State(state): State<AppState>) -> Result<Json<Vec<SpecialOffer>>> {
    let offers = CatalogRepository::new(state.pool())
        .list_current_offers()
        .await?;
    Ok(Json(offers))
}

/// `GET /api/settings`
pub async fn ui_settings(ResolvedSettings(settings): ResolvedSettings) -> Json<UiSettings> {
    Json(settings)
}
