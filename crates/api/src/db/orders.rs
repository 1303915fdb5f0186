//! Order and order-tracking repository.
//!
//! Reads go through the pool. The lifecycle writes (insert, lock, status
//! change, driver assignment, tracking rows) are associated functions over a
//! `PgConnection` so the order service can run them in one transaction.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use swiftbite_core::{
    ActorType, CustomerId, DriverId, LineItems, Money, OrderId, OrderNumber, OrderStatus,
    PaymentMethod, RestaurantId,
};

use super::RepositoryError;
use crate::models::{Order, TrackingEvent};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: OrderNumber,
    customer_id: Option<CustomerId>,
    restaurant_id: Option<RestaurantId>,
    customer_name: String,
    customer_phone: Option<String>,
    delivery_address: Option<String>,
    items: Json<LineItems>,
    subtotal: Money,
    delivery_fee: Money,
    total_amount: Money,
    status: OrderStatus,
    driver_id: Option<DriverId>,
    payment_method: PaymentMethod,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            restaurant_id: row.restaurant_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            delivery_address: row.delivery_address,
            items: row.items.0,
            subtotal: row.subtotal,
            delivery_fee: row.delivery_fee,
            total_amount: row.total_amount,
            status: row.status,
            driver_id: row.driver_id,
            payment_method: row.payment_method,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, restaurant_id, customer_name, \
     customer_phone, delivery_address, items, subtotal, delivery_fee, total_amount, status, \
     driver_id, payment_method, notes, created_at, updated_at";

const TRACKING_COLUMNS: &str = "id, order_id, status, message, actor_type, created_at";

/// A validated order ready to insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    pub restaurant_id: Option<RestaurantId>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub items: LineItems,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Order counts for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct OrderStats {
    pub by_status: Vec<(OrderStatus, i64)>,
    pub today_orders: i64,
    pub today_revenue: Money,
}

#[derive(Debug, sqlx::FromRow)]
struct TodayRow {
    orders: i64,
    revenue: Money,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Tracking history of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tracking(&self, order_id: OrderId) -> Result<Vec<TrackingEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, TrackingEvent>(&format!(
            "SELECT {TRACKING_COLUMNS} FROM order_tracking WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.fetch_orders(
            "WHERE customer_id = $1 ORDER BY created_at DESC, id DESC",
            customer_id.as_i32(),
        )
        .await
    }

    /// Confirmed orders that no driver has claimed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_unassigned(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE status = 'confirmed' AND driver_id IS NULL
            ORDER BY created_at, id
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A driver's orders that are neither delivered nor cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_for_driver(
        &self,
        driver_id: DriverId,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.fetch_orders(
            r"
            WHERE driver_id = $1 AND status NOT IN ('delivered', 'cancelled')
            ORDER BY created_at, id
            ",
            driver_id.as_i32(),
        )
        .await
    }

    /// A driver's delivered orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_delivered_for_driver(
        &self,
        driver_id: DriverId,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.fetch_orders(
            r"
            WHERE driver_id = $1 AND status = 'delivered'
            ORDER BY updated_at DESC, id DESC
            ",
            driver_id.as_i32(),
        )
        .await
    }

    /// Most recent orders, optionally of one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE $1::order_status IS NULL OR status = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Counts per status plus today's order count and delivered revenue.
    ///
    /// "Today" is the database server's current date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let by_status: Vec<(OrderStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status")
                .fetch_all(self.pool)
                .await?;

        let today = sqlx::query_as::<_, TodayRow>(
            r"
            SELECT COUNT(*) AS orders,
                   COALESCE(SUM(total_amount) FILTER (WHERE status = 'delivered'), 0) AS revenue
            FROM orders
            WHERE created_at >= CURRENT_DATE
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(OrderStats {
            by_status,
            today_orders: today.orders,
            today_revenue: today.revenue,
        })
    }

    async fn fetch_orders(&self, clause: &str, key: i32) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders {clause}"
        ))
        .bind(key)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // -------------------------------------------------------------------------
    // Transactional steps
    // -------------------------------------------------------------------------

    /// Insert an order under the given number.
    ///
    /// Returns `None` if the number is already taken so the caller can pick
    /// another without aborting its transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced customer or
    /// restaurant doesn't exist.
    pub async fn insert(
        conn: &mut PgConnection,
        number: &OrderNumber,
        new: &NewOrder,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (
                order_number, customer_id, restaurant_id, customer_name, customer_phone,
                delivery_address, items, subtotal, delivery_fee, total_amount,
                payment_method, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (order_number) DO NOTHING
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(number)
        .bind(new.customer_id)
        .bind(new.restaurant_id)
        .bind(&new.customer_name)
        .bind(new.customer_phone.as_deref())
        .bind(new.delivery_address.as_deref())
        .bind(Json(&new.items))
        .bind(new.subtotal)
        .bind(new.delivery_fee)
        .bind(new.total_amount)
        .bind(new.payment_method)
        .bind(new.notes.as_deref())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Load an order and hold its row lock until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(conn: &mut PgConnection, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Write a new status, and the driver when one is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: OrderId,
        status: OrderStatus,
        driver_id: Option<DriverId>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET status = $2,
                driver_id = COALESCE($3, driver_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(driver_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Append a tracking row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_tracking(
        conn: &mut PgConnection,
        order_id: OrderId,
        status: OrderStatus,
        message: &str,
        actor: ActorType,
    ) -> Result<TrackingEvent, RepositoryError> {
        let event = sqlx::query_as::<_, TrackingEvent>(&format!(
            r"
            INSERT INTO order_tracking (order_id, status, message, actor_type)
            VALUES ($1, $2, $3, $4)
            RETURNING {TRACKING_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(status)
        .bind(message)
        .bind(actor)
        .fetch_one(&mut *conn)
        .await?;

        Ok(event)
    }
}
