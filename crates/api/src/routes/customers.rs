//! Customer routes: profile, address book, order history and reviews.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use swiftbite_core::{AddressId, CustomerId, OrderId, Phone};

use crate::db::addresses::{AddressChanges, NewAddress};
use crate::db::{AddressRepository, CustomerRepository, OrderRepository, RepositoryError};
use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::models::{Customer, CustomerAddress, Order, Review};
use crate::services::ReviewService;
use crate::state::AppState;

/// Body of `POST /api/customers`.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Body of `PUT /api/customers/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Body of address create and update requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub label: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub is_default: Option<bool>,
}

/// Body of `POST /api/customers/orders/{order_id}/review`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub rating: i16,
    pub comment: Option<String>,
    pub customer_id: Option<CustomerId>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_phone(raw: &str) -> Result<Phone> {
    Phone::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid phone: {e}")))
}

fn customer_not_found() -> AppError {
    AppError::NotFound("Customer not found".to_string())
}

fn address_not_found() -> AppError {
    AppError::NotFound("Address not found".to_string())
}

/// Give a repository `NotFound` a specific message.
fn missing_as(err: RepositoryError, not_found: fn() -> AppError) -> AppError {
    match err {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    }
}

impl AddressRequest {
    fn into_new(self) -> Result<NewAddress> {
        let address = non_blank(self.address)
            .ok_or_else(|| AppError::BadRequest("address is required".to_string()))?;
        Ok(NewAddress {
            label: non_blank(self.label).unwrap_or_else(|| "Home".to_string()),
            address,
            notes: non_blank(self.notes),
            is_default: self.is_default.unwrap_or(false),
        })
    }

    fn into_changes(self) -> Result<AddressChanges> {
        if self.address.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err(AppError::BadRequest("address cannot be blank".to_string()));
        }
        Ok(AddressChanges {
            label: non_blank(self.label),
            address: non_blank(self.address),
            notes: self.notes,
            is_default: self.is_default,
        })
    }
}

/// `POST /api/customers`
///
/// Returns the existing customer (200) when the phone is already known,
/// otherwise creates one (201).
pub async fn find_or_create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let phone = request
        .phone
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("phone is required".to_string()))
        .and_then(parse_phone)?;
    let name = non_blank(request.name)
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;
    let email = non_blank(request.email);

    let (customer, created) = CustomerRepository::new(state.pool())
        .find_or_create(&name, &phone, email.as_deref())
        .await?;

    if created {
        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok((StatusCode::CREATED, Json(customer)))
    } else {
        Ok((StatusCode::OK, Json(customer)))
    }
}

/// `GET /api/customers/by-phone/{phone}`
pub async fn by_phone(
    State(state): State<AppState>,
    ApiPath(raw): ApiPath<String>,
) -> Result<Json<Customer>> {
    let phone = parse_phone(&raw)?;
    CustomerRepository::new(state.pool())
        .get_by_phone(&phone)
        .await?
        .map(Json)
        .ok_or_else(customer_not_found)
}

/// `GET /api/customers/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<Json<Customer>> {
    CustomerRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(customer_not_found)
}

/// `PUT /api/customers/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(request): ApiJson<CustomerUpdate>,
) -> Result<Json<Customer>> {
    let name = non_blank(request.name);
    let email = non_blank(request.email);
    let customer = CustomerRepository::new(state.pool())
        .update(id, name.as_deref(), email.as_deref())
        .await?;
    Ok(Json(customer))
}

/// `GET /api/customers/{id}/orders`
pub async fn orders(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(id)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/customers/{id}/addresses`
pub async fn list_addresses(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<Json<Vec<CustomerAddress>>> {
    Ok(Json(AddressRepository::new(state.pool()).list(id).await?))
}

/// `POST /api/customers/{id}/addresses`
pub async fn create_address(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(request): ApiJson<AddressRequest>,
) -> Result<(StatusCode, Json<CustomerAddress>)> {
    let new = request.into_new()?;
    let address = AddressRepository::new(state.pool())
        .create(id, &new)
        .await
        .map_err(|e| missing_as(e, customer_not_found))?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/customers/{id}/addresses/{address_id}`
pub async fn update_address(
    State(state): State<AppState>,
    ApiPath((id, address_id)): ApiPath<(CustomerId, AddressId)>,
    ApiJson(request): ApiJson<AddressRequest>,
) -> Result<Json<CustomerAddress>> {
    let changes = request.into_changes()?;
    AddressRepository::new(state.pool())
        .update(id, address_id, &changes)
        .await
        .map(Json)
        .map_err(|e| missing_as(e, address_not_found))
}

/// `DELETE /api/customers/{id}/addresses/{address_id}`
pub async fn delete_address(
    State(state): State<AppState>,
    ApiPath((id, address_id)): ApiPath<(CustomerId, AddressId)>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(id, address_id)
        .await
        .map_err(|e| missing_as(e, address_not_found))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/customers/{id}/addresses/{address_id}/default`
pub async fn set_default_address(
    State(state): State<AppState>,
    ApiPath((id, address_id)): ApiPath<(CustomerId, AddressId)>,
) -> Result<Json<CustomerAddress>> {
    AddressRepository::new(state.pool())
        .set_default(id, address_id)
        .await
        .map(Json)
        .map_err(|e| missing_as(e, address_not_found))
}

/// `POST /api/customers/orders/{order_id}/review`
pub async fn review_order(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<OrderId>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = ReviewService::new(state.pool())
        .submit(
            order_id,
            request.rating,
            request.comment.as_deref(),
            request.customer_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::{app, get, json_body, json_request};

    #[test]
    fn new_address_defaults_label() {
        let request: AddressRequest =
            serde_json::from_str(r#"{"address": " 12 Nile St ", "label": "  "}"#).unwrap();
        let new = request.into_new().unwrap();
        assert_eq!(new.label, "Home");
        assert_eq!(new.address, "12 Nile St");
        assert!(!new.is_default);
    }

    #[test]
    fn new_address_requires_address() {
        let request: AddressRequest = serde_json::from_str(r#"{"label": "Work"}"#).unwrap();
        assert!(matches!(request.into_new(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn changes_reject_blank_address() {
        let request: AddressRequest = serde_json::from_str(r#"{"address": ""}"#).unwrap();
        assert!(request.into_changes().is_err());

        let request: AddressRequest = serde_json::from_str(r#"{"isDefault": true}"#).unwrap();
        let changes = request.into_changes().unwrap();
        assert_eq!(changes.is_default, Some(true));
        assert!(changes.address.is_none());
    }

    #[tokio::test]
    async fn malformed_phone_is_rejected() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/customers",
                r#"{"name": "Ali", "phone": "call me"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid phone"));
    }

    #[tokio::test]
    async fn lookup_by_malformed_phone_is_rejected() {
        let response = app()
            .oneshot(get("/api/customers/by-phone/12"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/customers/orders/1/review",
                r#"{"rating": 9}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
