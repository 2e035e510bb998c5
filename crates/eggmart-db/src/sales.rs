//! Database operations for the `sales` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `sales` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleRow {
    pub id: i64,
    pub product_id: i64,
    pub original_price: Decimal,
    pub sale_price: Decimal,
    pub discount_percentage: i16,
    pub quantity_available: i32,
    pub quantity_sold: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SaleRow {
    /// Units still purchasable under this sale.
    #[must_use]
    pub fn remaining(&self) -> i32 {
        self.quantity_available - self.quantity_sold
    }
}

/// Input for sale creation. `original_price` is snapshotted from the product
/// at creation time.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub product_id: i64,
    pub original_price: Decimal,
    pub sale_price: Decimal,
    pub discount_percentage: i16,
    pub quantity_available: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Returns the effectively-active sale for a product, if any: status
/// `active` and the current time inside `[start_date, end_date]`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_effective_sale(
    pool: &PgPool,
    product_id: i64,
) -> Result<Option<SaleRow>, DbError> {
    let row = sqlx::query_as::<_, SaleRow>(
        "SELECT id, product_id, original_price, sale_price, discount_percentage, \
                quantity_available, quantity_sold, start_date, end_date, status, \
                created_at, updated_at \
         FROM sales \
         WHERE product_id = $1 \
           AND status = 'active' \
           AND NOW() BETWEEN start_date AND end_date \
         ORDER BY id DESC \
         LIMIT 1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Flips `active` sales whose `end_date` has passed to `expired`.
///
/// Returns the number of sales expired. This is the lazy sweep run on
/// catalog reads; the transition is one-way.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn expire_stale_sales(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE sales \
         SET status = 'expired', updated_at = NOW() \
         WHERE status = 'active' AND end_date < NOW()",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Creates a sale row in `active` status and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_sale(pool: &PgPool, sale: &NewSale) -> Result<SaleRow, DbError> {
    let row = sqlx::query_as::<_, SaleRow>(
        "INSERT INTO sales \
             (product_id, original_price, sale_price, discount_percentage, \
              quantity_available, start_date, end_date, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'active') \
         RETURNING id, product_id, original_price, sale_price, discount_percentage, \
                   quantity_available, quantity_sold, start_date, end_date, status, \
                   created_at, updated_at",
    )
    .bind(sale.product_id)
    .bind(sale.original_price)
    .bind(sale.sale_price)
    .bind(sale.discount_percentage)
    .bind(sale.quantity_available)
    .bind(sale.start_date)
    .bind(sale.end_date)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all sales, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sales(pool: &PgPool) -> Result<Vec<SaleRow>, DbError> {
    let rows = sqlx::query_as::<_, SaleRow>(
        "SELECT id, product_id, original_price, sale_price, discount_percentage, \
                quantity_available, quantity_sold, start_date, end_date, status, \
                created_at, updated_at \
         FROM sales \
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sets a sale's status (`active`/`inactive`).
///
/// The `expired` status is reserved for the lazy sweep in
/// [`expire_stale_sales`] and is rejected by the handler layer.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row was updated, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn set_sale_status(pool: &PgPool, sale_id: i64, status: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sales \
         SET status = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(status)
    .bind(sale_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
