//! Database operations for persisted `notifications` plus the synthesized
//! admin buckets (low stock, recent reviews, new orders, stale reminders)
//! and the sale promos merged into the customer feed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `notifications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub order_id: Option<i64>,
    pub product_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A product running low on stock.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStockRow {
    pub id: i64,
    pub name: String,
    pub stock: i32,
    pub category_name: String,
}

/// A recent review with the product and reviewer it concerns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentReviewRow {
    pub rating_id: i64,
    pub rating: i16,
    pub review_text: Option<String>,
    pub product_name: String,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}

/// A recently placed order for the admin feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NewOrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An order waiting on fulfilment attention.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaleOrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// An effectively-active sale, synthesized into the customer feed as a
/// promo notification with a string id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SalePromoRow {
    pub sale_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub sale_price: Decimal,
    pub original_price: Decimal,
    pub discount_percentage: i16,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Persisted notifications
// ---------------------------------------------------------------------------

/// Inserts a notification row for a user.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_notification(
    pool: &PgPool,
    user_id: i64,
    kind: &str,
    title: &str,
    message: &str,
    order_id: Option<i64>,
    product_id: Option<i64>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO notifications (user_id, kind, title, message, order_id, product_id) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(kind)
    .bind(title)
    .bind(message)
    .bind(order_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns a user's persisted notifications, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_notifications_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<NotificationRow>, DbError> {
    let rows = sqlx::query_as::<_, NotificationRow>(
        "SELECT id, user_id, kind, title, message, order_id, product_id, is_read, created_at \
         FROM notifications \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Marks one of the caller's notifications as read.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the row does not exist or belongs to
/// another user, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_notification_read(
    pool: &PgPool,
    user_id: i64,
    notification_id: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
    )
    .bind(notification_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Synthesized feeds
// ---------------------------------------------------------------------------

/// Products at or below `threshold` units, lowest stock first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_low_stock_products(
    pool: &PgPool,
    threshold: i32,
    limit: i64,
) -> Result<Vec<LowStockRow>, DbError> {
    let rows = sqlx::query_as::<_, LowStockRow>(
        "SELECT p.id, p.name, p.stock, c.name AS category_name \
         FROM products p \
         JOIN categories c ON c.id = p.category_id \
         WHERE p.stock <= $1 \
         ORDER BY p.stock ASC, p.id ASC \
         LIMIT $2",
    )
    .bind(threshold)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The newest `limit` reviews joined across rating, order, order item, and
/// product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_reviews(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<RecentReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, RecentReviewRow>(
        "SELECT r.id AS rating_id, r.rating, r.review_text, \
                p.name AS product_name, u.name AS reviewer_name, r.created_at \
         FROM order_ratings r \
         JOIN orders o ON o.id = r.order_id \
         JOIN order_items oi ON oi.order_id = o.id \
         JOIN products p ON p.id = oi.product_id \
         JOIN users u ON u.id = r.user_id \
         ORDER BY r.created_at DESC, r.id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Orders placed since `since`, excluding cancelled ones, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_new_orders_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<NewOrderRow>, DbError> {
    let rows = sqlx::query_as::<_, NewOrderRow>(
        "SELECT id, order_number, customer_name, status, total_amount, created_at \
         FROM orders \
         WHERE created_at >= $1 AND status <> 'cancelled' \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Orders from the last 7 days still in `confirmed` or `processing`,
/// `processing` first, then oldest first — the fulfilment reminder queue.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stale_order_reminders(pool: &PgPool) -> Result<Vec<StaleOrderRow>, DbError> {
    let rows = sqlx::query_as::<_, StaleOrderRow>(
        "SELECT id, order_number, customer_name, status, created_at \
         FROM orders \
         WHERE status IN ('confirmed', 'processing') \
           AND created_at >= NOW() - INTERVAL '7 days' \
         ORDER BY CASE status WHEN 'processing' THEN 0 ELSE 1 END, created_at ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// All effectively-active sales with product context, for synthesized sale
/// promos in the customer feed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sale_promos(pool: &PgPool) -> Result<Vec<SalePromoRow>, DbError> {
    let rows = sqlx::query_as::<_, SalePromoRow>(
        "SELECT s.id AS sale_id, s.product_id, p.name AS product_name, \
                s.sale_price, s.original_price, s.discount_percentage, \
                s.end_date, s.created_at \
         FROM sales s \
         JOIN products p ON p.id = s.product_id \
         WHERE s.status = 'active' AND NOW() BETWEEN s.start_date AND s.end_date \
         ORDER BY s.created_at DESC, s.id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
