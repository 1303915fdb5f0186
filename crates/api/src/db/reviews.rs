//! Review repository.

use sqlx::{PgConnection, PgPool};

use swiftbite_core::{CustomerId, OrderId, RestaurantId};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_COLUMNS: &str = "id, order_id, customer_id, restaurant_id, rating, comment, created_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A restaurant's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: RestaurantId,
        limit: i64,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE restaurant_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(restaurant_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert a review. Returns `None` if the order already has one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        conn: &mut PgConnection,
        order_id: OrderId,
        customer_id: Option<CustomerId>,
        restaurant_id: Option<RestaurantId>,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r"
            INSERT INTO reviews (order_id, customer_id, restaurant_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(customer_id)
        .bind(restaurant_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(review)
    }

    /// Recompute a restaurant's average rating and review count from its reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn refresh_restaurant_rating(
        conn: &mut PgConnection,
        restaurant_id: RestaurantId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE restaurants r
            SET rating = COALESCE(agg.avg_rating, 0),
                review_count = agg.review_count,
                updated_at = NOW()
            FROM (
                SELECT ROUND(AVG(rating)::NUMERIC, 1) AS avg_rating,
                       COUNT(*)::INTEGER AS review_count
                FROM reviews
                WHERE restaurant_id = $1
            ) agg
            WHERE r.id = $1
            ",
        )
        .bind(restaurant_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
