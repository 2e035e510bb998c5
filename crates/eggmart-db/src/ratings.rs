//! Database operations for `order_ratings` and `order_rating_images`.

use chrono::{DateTime, Utc};
use eggmart_core::ratings::MAX_RATING_IMAGES;
use eggmart_core::OrderStatus;
use sqlx::PgPool;

use crate::DbError;

/// A rating row joined with the reviewer's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingRow {
    pub id: i64,
    pub user_id: i64,
    pub order_id: i64,
    pub rating: i16,
    pub review_text: Option<String>,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `order_rating_images` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingImageRow {
    pub id: i64,
    pub order_rating_id: i64,
    pub image_url: String,
    pub image_name: String,
    pub image_size: i64,
}

/// An image attached to a new rating. The handler has already dropped
/// entries missing any field.
#[derive(Debug, Clone)]
pub struct NewRatingImage<'a> {
    pub image_url: &'a str,
    pub image_name: &'a str,
    pub image_size: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderForRating {
    user_id: i64,
    status: String,
}

/// Creates a rating for a delivered order owned by `user_id`, replacing any
/// images and inserting at most [`MAX_RATING_IMAGES`] of them, in one
/// transaction.
///
/// Duplicate submissions are stopped by the `(user_id, order_id)` unique
/// constraint, not a pre-check; callers detect the violation with
/// [`DbError::is_unique_violation`].
///
/// # Errors
///
/// - [`DbError::NotFound`] — order missing or owned by someone else.
/// - [`DbError::OrderNotDelivered`] — order status is not `delivered`.
/// - [`DbError::Sqlx`] — statement failure, including the unique violation
///   for an already-rated order.
pub async fn create_rating(
    pool: &PgPool,
    user_id: i64,
    order_id: i64,
    rating: i16,
    review_text: Option<&str>,
    images: &[NewRatingImage<'_>],
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, OrderForRating>(
        "SELECT user_id, status FROM orders WHERE id = $1",
    )
    .bind(order_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    if order.user_id != user_id {
        return Err(DbError::NotFound);
    }
    if order.status != OrderStatus::Delivered.as_str() {
        return Err(DbError::OrderNotDelivered { order_id });
    }

    let rating_id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_ratings (user_id, order_id, rating, review_text) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(user_id)
    .bind(order_id)
    .bind(rating)
    .bind(review_text)
    .fetch_one(&mut *tx)
    .await?;

    // A fresh rating has no images; the delete keeps the replace semantics
    // correct if this path is ever reused for updates.
    sqlx::query("DELETE FROM order_rating_images WHERE order_rating_id = $1")
        .bind(rating_id)
        .execute(&mut *tx)
        .await?;

    for image in images.iter().take(MAX_RATING_IMAGES) {
        sqlx::query(
            "INSERT INTO order_rating_images \
                 (order_rating_id, image_url, image_name, image_size) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(rating_id)
        .bind(image.image_url)
        .bind(image.image_name)
        .bind(image.image_size)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(rating_id)
}

/// Returns all ratings for an order, newest first, with reviewer names.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ratings_for_order(
    pool: &PgPool,
    order_id: i64,
) -> Result<Vec<RatingRow>, DbError> {
    let rows = sqlx::query_as::<_, RatingRow>(
        "SELECT r.id, r.user_id, r.order_id, r.rating, r.review_text, \
                u.name AS reviewer_name, r.created_at, r.updated_at \
         FROM order_ratings r \
         JOIN users u ON u.id = r.user_id \
         WHERE r.order_id = $1 \
         ORDER BY r.created_at DESC, r.id DESC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all images attached to any rating of an order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_rating_images_for_order(
    pool: &PgPool,
    order_id: i64,
) -> Result<Vec<RatingImageRow>, DbError> {
    let rows = sqlx::query_as::<_, RatingImageRow>(
        "SELECT i.id, i.order_rating_id, i.image_url, i.image_name, i.image_size \
         FROM order_rating_images i \
         JOIN order_ratings r ON r.id = i.order_rating_id \
         WHERE r.order_id = $1 \
         ORDER BY i.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes the caller's rating for an order; attached images cascade.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row was deleted, or
/// [`DbError::Sqlx`] if the statement fails.
pub async fn delete_rating(pool: &PgPool, user_id: i64, order_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM order_ratings WHERE user_id = $1 AND order_id = $2")
        .bind(user_id)
        .bind(order_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
