//! Reviews of delivered orders.

use sqlx::PgPool;
use tracing::instrument;

use swiftbite_core::{CustomerId, OrderId, OrderStatus};

use super::ServiceError;
use crate::db::{OrderRepository, ReviewRepository};
use crate::models::Review;

/// Allowed star ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<i16> = 1..=5;

/// Check a star rating.
///
/// # Errors
///
/// Returns `ServiceError::Validation` outside 1 to 5.
pub fn validate_rating(rating: i16) -> Result<i16, ServiceError> {
    if RATING_RANGE.contains(&rating) {
        Ok(rating)
    } else {
        Err(ServiceError::Validation(
            "rating must be between 1 and 5".to_string(),
        ))
    }
}

/// Review service.
pub struct ReviewService<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Review a delivered order and refresh the restaurant's rating.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad rating or a customer that
    /// doesn't own the order, `ServiceError::NotFound` for an unknown order,
    /// and `ServiceError::Conflict` if the order isn't delivered or was
    /// already reviewed.
    #[instrument(skip(self, comment), fields(order_id = %order_id))]
    pub async fn submit(
        &self,
        order_id: OrderId,
        rating: i16,
        comment: Option<&str>,
        customer_id: Option<CustomerId>,
    ) -> Result<Review, ServiceError> {
        let rating = validate_rating(rating)?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::lock(&mut tx, order_id)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;

        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::Conflict(
                "only delivered orders can be reviewed".to_string(),
            ));
        }

        if let (Some(claimed), Some(owner)) = (customer_id, order.customer_id)
            && claimed != owner
        {
            return Err(ServiceError::Validation(
                "order belongs to another customer".to_string(),
            ));
        }

        let review = ReviewRepository::insert(
            &mut tx,
            order_id,
            customer_id.or(order.customer_id),
            order.restaurant_id,
            rating,
            comment,
        )
        .await?
        .ok_or_else(|| ServiceError::Conflict("order has already been reviewed".to_string()))?;

        if let Some(restaurant_id) = order.restaurant_id {
            ReviewRepository::refresh_restaurant_rating(&mut tx, restaurant_id).await?;
        }

        tx.commit().await?;

        tracing::info!(rating, "Review submitted");
        Ok(review)
    }
}
