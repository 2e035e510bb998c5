//! Database operations for the `cart_items` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A cart row joined with current product pricing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemRow {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Adds a product to a user's cart; an existing row for the same product
/// has the quantities added together.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_cart_item(
    pool: &PgPool,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO cart_items (user_id, product_id, quantity) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, product_id) DO UPDATE SET \
             quantity   = cart_items.quantity + EXCLUDED.quantity, \
             updated_at = NOW()",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns a user's cart with current product names and prices.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cart_items_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<CartItemRow>, DbError> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT ci.id, ci.product_id, p.name AS product_name, p.price, \
                ci.quantity, ci.updated_at \
         FROM cart_items ci \
         JOIN products p ON p.id = ci.product_id \
         WHERE ci.user_id = $1 \
         ORDER BY ci.updated_at DESC, ci.id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
