//! Order lifecycle: placement, status transitions, driver claims.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use swiftbite_core::{
    ActorType, CustomerId, DriverId, LineItems, Money, OrderId, OrderNumber, OrderStatus,
    PaymentMethod, Phone, RestaurantId, UiSettings,
};

use super::ServiceError;
use crate::db::orders::NewOrder;
use crate::db::{DriverRepository, OrderRepository};
use crate::models::{Order, OrderTracking};

/// Attempts at finding a free order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Body of `POST /api/orders`.
///
/// Everything is optional at the serde level so missing fields produce a
/// precise validation message instead of a generic decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub restaurant_id: Option<RestaurantId>,
    pub items: Option<LineItems>,
    pub subtotal: Option<Money>,
    pub delivery_fee: Option<Money>,
    pub total_amount: Option<Money>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// A requested status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub driver_id: Option<DriverId>,
    pub actor: ActorType,
    /// Overrides the default tracking message.
    pub message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate an order request against the current settings.
///
/// # Errors
///
/// Returns `ServiceError::Unavailable` when ordering is switched off, and
/// `ServiceError::Validation` for any invalid field.
pub fn prepare_order(
    request: CreateOrderRequest,
    settings: &UiSettings,
) -> Result<NewOrder, ServiceError> {
    if !settings.accept_orders {
        return Err(ServiceError::Unavailable(
            "We are not accepting orders right now".to_string(),
        ));
    }

    let customer_name = non_blank(request.customer_name)
        .ok_or_else(|| ServiceError::Validation("customerName is required".to_string()))?;

    let items = request
        .items
        .ok_or_else(|| ServiceError::Validation("items is required".to_string()))?;
    items
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let total_amount = request
        .total_amount
        .ok_or_else(|| ServiceError::Validation("totalAmount is required".to_string()))?
        .in_range()
        .map_err(|e| ServiceError::Validation(format!("totalAmount: {e}")))?;

    let subtotal = match request.subtotal {
        Some(subtotal) => subtotal
            .in_range()
            .map_err(|e| ServiceError::Validation(format!("subtotal: {e}")))?,
        None => items
            .subtotal()
            .map_err(|e| ServiceError::Validation(e.to_string()))?,
    };

    let delivery_fee = request
        .delivery_fee
        .unwrap_or(settings.default_delivery_fee)
        .in_range()
        .map_err(|e| ServiceError::Validation(format!("deliveryFee: {e}")))?;

    let payment_method = request.payment_method.unwrap_or_default();
    if payment_method == PaymentMethod::Cash && !settings.allow_cash_payment {
        return Err(ServiceError::Validation(
            "Cash payment is currently unavailable".to_string(),
        ));
    }

    let customer_phone = non_blank(request.customer_phone)
        .map(|raw| {
            Phone::parse(&raw)
                .map(Phone::into_inner)
                .map_err(|e| ServiceError::Validation(format!("customerPhone: {e}")))
        })
        .transpose()?;

    Ok(NewOrder {
        customer_id: request.customer_id,
        restaurant_id: request.restaurant_id,
        customer_name,
        customer_phone,
        delivery_address: non_blank(request.delivery_address),
        items,
        subtotal,
        delivery_fee,
        total_amount,
        payment_method,
        notes: non_blank(request.notes),
    })
}

/// Check a requested change against the order's current state.
///
/// Asking for the current status again is only meaningful as a driver
/// assignment on an order that can still take one.
///
/// # Errors
///
/// Returns `ServiceError::Transition` for moves outside the transition table
/// and `ServiceError::Validation` for a driver on a cancellation.
pub fn check_transition(
    current: OrderStatus,
    target: OrderStatus,
    assigning_driver: bool,
) -> Result<(), ServiceError> {
    if current == target {
        if assigning_driver && current.accepts_driver() {
            return Ok(());
        }
        return Err(ServiceError::Conflict(format!("order is already {current}")));
    }

    current.transition(target)?;

    if assigning_driver && target == OrderStatus::Cancelled {
        return Err(ServiceError::Validation(
            "a cancelled order cannot be assigned a driver".to_string(),
        ));
    }
    Ok(())
}

/// Only an admin may move an order from one driver to another.
///
/// # Errors
///
/// Returns `ServiceError::Conflict` when a non-admin names a different
/// driver than the one already assigned.
pub fn check_reassignment(
    assigned: Option<DriverId>,
    requested: Option<DriverId>,
    actor: ActorType,
) -> Result<(), ServiceError> {
    match (assigned, requested) {
        (Some(current), Some(next)) if current != next && actor != ActorType::Admin => Err(
            ServiceError::Conflict("order is already assigned to another driver".to_string()),
        ),
        _ => Ok(()),
    }
}

fn generate_order_number() -> OrderNumber {
    OrderNumber::new(Utc::now().date_naive(), rand::random_range(0..1_000_000))
}

/// Order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a validated order with its first tracking row.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Conflict` if no free order number was found or a
    /// referenced customer/restaurant doesn't exist.
    #[instrument(skip(self, order), fields(total = %order.total_amount))]
    pub async fn place(&self, order: &NewOrder) -> Result<Order, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let mut placed = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let number = generate_order_number();
            if let Some(inserted) = OrderRepository::insert(&mut tx, &number, order).await? {
                placed = Some(inserted);
                break;
            }
            tracing::debug!(order_number = %number, "Order number taken, retrying");
        }
        let placed = placed.ok_or_else(|| {
            ServiceError::Conflict("could not allocate an order number".to_string())
        })?;

        OrderRepository::insert_tracking(
            &mut tx,
            placed.id,
            OrderStatus::Pending,
            OrderStatus::Pending.tracking_message(),
            ActorType::Customer,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %placed.id,
            order_number = %placed.order_number,
            total = %placed.total_amount,
            "Order placed"
        );
        Ok(placed)
    }

    /// Get an order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order doesn't exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, ServiceError> {
        OrderRepository::new(self.pool)
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("order"))
    }

    /// An order with its tracking history and assigned driver.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order doesn't exist.
    pub async fn track(&self, id: OrderId) -> Result<OrderTracking, ServiceError> {
        let orders = OrderRepository::new(self.pool);
        let order = orders.get_by_id(id).await?.ok_or(ServiceError::NotFound("order"))?;
        let tracking = orders.tracking(id).await?;

        let driver = match order.driver_id {
            Some(driver_id) => DriverRepository::new(self.pool)
                .get_by_id(driver_id)
                .await?
                .map(|d| d.summary()),
            None => None,
        };

        Ok(OrderTracking {
            order,
            tracking,
            driver,
        })
    }

    /// Apply a status change atomically.
    ///
    /// The order row stays locked while the change is validated, written,
    /// logged to tracking and, on delivery, credited to the driver.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown order or driver and
    /// `ServiceError::Transition`/`Conflict` when the change isn't allowed.
    #[instrument(skip(self, change), fields(order_id = %id, to = %change.status))]
    pub async fn change_status(
        &self,
        id: OrderId,
        change: StatusChange,
    ) -> Result<Order, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let current = OrderRepository::lock(&mut tx, id)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;

        check_transition(current.status, change.status, change.driver_id.is_some())?;
        check_reassignment(current.driver_id, change.driver_id, change.actor)?;

        if let Some(driver_id) = change.driver_id {
            let driver = DriverRepository::get_in(&mut tx, driver_id)
                .await?
                .ok_or(ServiceError::NotFound("driver"))?;
            if !driver.is_active {
                return Err(ServiceError::Conflict("driver is inactive".to_string()));
            }
        }

        let updated =
            OrderRepository::set_status(&mut tx, id, change.status, change.driver_id).await?;

        let message = change.message.unwrap_or_else(|| {
            if current.status == change.status {
                "Driver assigned".to_string()
            } else {
                change.status.tracking_message().to_string()
            }
        });
        OrderRepository::insert_tracking(&mut tx, id, change.status, &message, change.actor)
            .await?;

        if change.status == OrderStatus::Delivered
            && let Some(driver_id) = updated.driver_id
        {
            DriverRepository::credit_earnings(&mut tx, driver_id, updated.delivery_fee).await?;
        }

        tx.commit().await?;

        tracing::info!(
            from = %current.status,
            to = %updated.status,
            driver_id = ?updated.driver_id,
            actor = %change.actor,
            "Order status changed"
        );
        Ok(updated)
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Transition` if the order is past `pending`.
    pub async fn cancel(
        &self,
        id: OrderId,
        actor: ActorType,
        reason: Option<String>,
    ) -> Result<Order, ServiceError> {
        self.change_status(
            id,
            StatusChange {
                status: OrderStatus::Cancelled,
                driver_id: None,
                actor,
                message: non_blank(reason).map(|r| format!("Order cancelled: {r}")),
            },
        )
        .await
    }

    /// Orders a driver may claim. Empty unless the driver is active and available.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the driver doesn't exist.
    pub async fn available_for_driver(&self, driver_id: DriverId) -> Result<Vec<Order>, ServiceError> {
        let driver = DriverRepository::new(self.pool)
            .get_by_id(driver_id)
            .await?
            .ok_or(ServiceError::NotFound("driver"))?;

        if !driver.can_take_orders() {
            return Ok(Vec::new());
        }

        Ok(OrderRepository::new(self.pool).list_unassigned().await?)
    }

    /// Claim a confirmed, unassigned order for a driver.
    ///
    /// Compare-and-swap on `driver_id IS NULL` under a row lock: of two
    /// drivers claiming the same order, the second sees a conflict.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown order or driver, and
    /// `ServiceError::Conflict` if the driver can't take orders or the order
    /// is no longer up for grabs.
    #[instrument(skip(self), fields(order_id = %order_id, driver_id = %driver_id))]
    pub async fn claim(&self, order_id: OrderId, driver_id: DriverId) -> Result<Order, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let driver = DriverRepository::get_in(&mut tx, driver_id)
            .await?
            .ok_or(ServiceError::NotFound("driver"))?;
        if !driver.can_take_orders() {
            return Err(ServiceError::Conflict(
                "driver must be active and available to accept orders".to_string(),
            ));
        }

        let order = OrderRepository::lock(&mut tx, order_id)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;
        if order.status != OrderStatus::Confirmed || order.driver_id.is_some() {
            return Err(ServiceError::Conflict(
                "order is no longer available".to_string(),
            ));
        }

        let claimed =
            OrderRepository::set_status(&mut tx, order_id, order.status, Some(driver_id)).await?;
        OrderRepository::insert_tracking(
            &mut tx,
            order_id,
            claimed.status,
            &format!("Driver {} accepted the order", driver.name),
            ActorType::Driver,
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Order claimed");
        Ok(claimed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateOrderRequest {
        serde_json::from_str(json).unwrap()
    }

    fn err_message(result: Result<NewOrder, ServiceError>) -> String {
        match result {
            Err(e) => e.to_string(),
            Ok(order) => panic!("expected error, got {order:?}"),
        }
    }

    #[test]
    fn prepares_minimal_order_with_encoded_items() {
        let req = request(
            r#"{
                "customerName": "Ali",
                "items": "[{\"name\":\"Burger\",\"price\":\"20\",\"quantity\":2}]",
                "totalAmount": "50"
            }"#,
        );
        let settings = UiSettings {
            default_delivery_fee: Money::from_minor(500),
            ..UiSettings::default()
        };

        let order = prepare_order(req, &settings).unwrap();
        assert_eq!(order.customer_name, "Ali");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.subtotal, Money::from_minor(4000));
        assert_eq!(order.delivery_fee, Money::from_minor(500));
        assert_eq!(order.total_amount, Money::from_minor(5000));
        assert_eq!(order.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn explicit_amounts_are_kept() {
        let req = request(
            r#"{
                "customerName": "Sara",
                "items": [{"name": "Tea", "price": 3, "quantity": 1}],
                "subtotal": 3,
                "deliveryFee": "0",
                "totalAmount": 3,
                "paymentMethod": "card",
                "customerPhone": "+966 50 123 4567",
                "notes": "  "
            }"#,
        );

        let order = prepare_order(req, &UiSettings::default()).unwrap();
        assert_eq!(order.delivery_fee, Money::ZERO);
        assert_eq!(order.payment_method, PaymentMethod::Card);
        assert_eq!(order.customer_phone.as_deref(), Some("+966501234567"));
        assert_eq!(order.notes, None);
    }

    #[test]
    fn rejects_missing_fields() {
        let settings = UiSettings::default();

        let msg = err_message(prepare_order(
            request(r#"{"items": [{"name":"A","price":1}], "totalAmount": 1}"#),
            &settings,
        ));
        assert!(msg.contains("customerName"));

        let msg = err_message(prepare_order(
            request(r#"{"customerName": "A", "totalAmount": 1}"#),
            &settings,
        ));
        assert!(msg.contains("items"));

        let msg = err_message(prepare_order(
            request(r#"{"customerName": "A", "items": [{"name":"A","price":1}]}"#),
            &settings,
        ));
        assert!(msg.contains("totalAmount"));
    }

    #[test]
    fn rejects_empty_items_and_negative_total() {
        let settings = UiSettings::default();

        let result = prepare_order(
            request(r#"{"customerName": "A", "items": [], "totalAmount": 1}"#),
            &settings,
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = prepare_order(
            request(r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": "-1"}"#),
            &settings,
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn oversized_amounts_are_validation_errors() {
        let settings = UiSettings::default();

        let msg = err_message(prepare_order(
            request(r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": "100000000000"}"#),
            &settings,
        ));
        assert!(msg.contains("totalAmount"));

        let msg = err_message(prepare_order(
            request(r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": 1, "deliveryFee": "123456789"}"#),
            &settings,
        ));
        assert!(msg.contains("deliveryFee"));

        let msg = err_message(prepare_order(
            request(r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": 1, "subtotal": "1000000000"}"#),
            &settings,
        ));
        assert!(msg.contains("subtotal"));
    }

    #[test]
    fn huge_item_prices_do_not_panic() {
        let result = prepare_order(
            request(
                r#"{
                    "customerName": "A",
                    "items": [{"name":"Platter","price":"79228162514264337593543950335","quantity":2}],
                    "totalAmount": 1
                }"#,
            ),
            &UiSettings::default(),
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = prepare_order(
            request(
                r#"{
                    "customerName": "A",
                    "items": [{"name":"Feast","price":"90000000","quantity":2}],
                    "totalAmount": 1
                }"#,
            ),
            &UiSettings::default(),
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn closed_platform_refuses_orders() {
        let settings = UiSettings {
            accept_orders: false,
            ..UiSettings::default()
        };
        let result = prepare_order(
            request(r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": 1}"#),
            &settings,
        );
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }

    #[test]
    fn cash_can_be_switched_off() {
        let settings = UiSettings {
            allow_cash_payment: false,
            ..UiSettings::default()
        };
        let body = r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": 1}"#;

        let result = prepare_order(request(body), &settings);
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let card = r#"{"customerName": "A", "items": [{"name":"A","price":1}], "totalAmount": 1, "paymentMethod": "wallet"}"#;
        assert!(prepare_order(request(card), &settings).is_ok());
    }

    #[test]
    fn forward_transitions_pass() {
        for status in OrderStatus::ALL {
            if let Some(next) = status.next() {
                assert!(check_transition(status, next, false).is_ok());
            }
        }
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Cancelled, false).is_ok());
    }

    #[test]
    fn skipping_or_reversing_is_rejected() {
        assert!(matches!(
            check_transition(OrderStatus::Pending, OrderStatus::Delivered, false),
            Err(ServiceError::Transition(_))
        ));
        assert!(matches!(
            check_transition(OrderStatus::OnWay, OrderStatus::Preparing, false),
            Err(ServiceError::Transition(_))
        ));
        assert!(matches!(
            check_transition(OrderStatus::Confirmed, OrderStatus::Cancelled, false),
            Err(ServiceError::Transition(_))
        ));
    }

    #[test]
    fn same_status_only_as_driver_assignment() {
        assert!(check_transition(OrderStatus::Preparing, OrderStatus::Preparing, true).is_ok());
        assert!(matches!(
            check_transition(OrderStatus::Preparing, OrderStatus::Preparing, false),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            check_transition(OrderStatus::Pending, OrderStatus::Pending, true),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            check_transition(OrderStatus::Delivered, OrderStatus::Delivered, true),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn only_admins_take_an_order_from_its_driver() {
        let first = DriverId::new(1);
        let second = DriverId::new(2);

        for actor in [ActorType::Customer, ActorType::Driver, ActorType::System] {
            assert!(matches!(
                check_reassignment(Some(first), Some(second), actor),
                Err(ServiceError::Conflict(_))
            ));
        }
        assert!(check_reassignment(Some(first), Some(second), ActorType::Admin).is_ok());
        assert!(check_reassignment(Some(first), Some(first), ActorType::Driver).is_ok());
        assert!(check_reassignment(Some(first), None, ActorType::System).is_ok());
        assert!(check_reassignment(None, Some(second), ActorType::System).is_ok());
    }

    #[test]
    fn cancelled_orders_take_no_driver() {
        assert!(matches!(
            check_transition(OrderStatus::Pending, OrderStatus::Cancelled, true),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn order_numbers_carry_today() {
        let number = generate_order_number();
        let today = Utc::now().date_naive().format("%Y%m%d").to_string();
        assert!(number.as_str().starts_with(&format!("SB-{today}-")));
    }
}
