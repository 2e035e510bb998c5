//! Database operations for `products`, `categories`, and `product_images`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{sales, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub public_id: Uuid,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    /// Merchandising flag (`active`/`inactive`), set from `stock > 10` at
    /// creation time and never recomputed afterwards. Availability is the
    /// derived `stock > 0`, not this field.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `product_images` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductImageRow {
    pub id: i64,
    pub product_id: i64,
    pub image_url: String,
    pub position: i32,
    pub is_primary: bool,
}

/// A catalog card: product joined with its category, the effectively-active
/// sale (if any), and rating aggregates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub status: String,
    pub category_name: String,
    pub primary_image_url: Option<String>,
    pub sale_id: Option<i64>,
    pub sale_price: Option<Decimal>,
    pub discount_percentage: Option<i16>,
    pub sale_ends_at: Option<DateTime<Utc>>,
    pub rating_count: i64,
    pub avg_rating: Option<Decimal>,
}

/// Input for product creation.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub category_name: &'a str,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<&'a str>,
}

/// Image attached at product creation. `is_primary` marks the storefront
/// thumbnail; when no image is flagged, the first one becomes primary.
#[derive(Debug, Clone)]
pub struct NewProductImage<'a> {
    pub image_url: &'a str,
    pub is_primary: bool,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns catalog cards for all products, newest first.
///
/// Sales past their `end_date` are lazily flipped to `expired` before the
/// read; there is no background sweeper, so this is the only place the flip
/// happens.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_catalog(pool: &PgPool) -> Result<Vec<CatalogRow>, DbError> {
    sales::expire_stale_sales(pool).await?;

    let rows = sqlx::query_as::<_, CatalogRow>(
        "SELECT p.id, p.name, p.description, p.price, p.stock, p.status, \
                c.name AS category_name, \
                img.image_url AS primary_image_url, \
                s.id AS sale_id, s.sale_price, s.discount_percentage, \
                s.end_date AS sale_ends_at, \
                r.rating_count, r.avg_rating \
         FROM products p \
         JOIN categories c ON c.id = p.category_id \
         LEFT JOIN LATERAL ( \
             SELECT image_url FROM product_images \
             WHERE product_id = p.id \
             ORDER BY is_primary DESC, position ASC, id ASC \
             LIMIT 1 \
         ) img ON TRUE \
         LEFT JOIN LATERAL ( \
             SELECT id, sale_price, discount_percentage, end_date \
             FROM sales \
             WHERE product_id = p.id \
               AND status = 'active' \
               AND NOW() BETWEEN start_date AND end_date \
             ORDER BY id DESC \
             LIMIT 1 \
         ) s ON TRUE \
         LEFT JOIN LATERAL ( \
             SELECT COUNT(orr.id) AS rating_count, \
                    AVG(orr.rating)::numeric(3,2) AS avg_rating \
             FROM order_ratings orr \
             JOIN order_items oi ON oi.order_id = orr.order_id \
             WHERE oi.product_id = p.id \
         ) r ON TRUE \
         ORDER BY p.created_at DESC, p.id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a product by internal id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_product(pool: &PgPool, product_id: i64) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, public_id, category_id, name, description, price, stock, status, \
                created_at, updated_at \
         FROM products \
         WHERE id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns all images for a product, primary first then by position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_images(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<ProductImageRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductImageRow>(
        "SELECT id, product_id, image_url, position, is_primary \
         FROM product_images \
         WHERE product_id = $1 \
         ORDER BY is_primary DESC, position ASC, id ASC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Creates a product, resolving its category by name (creating it when
/// missing) and inserting its images, all in one transaction.
///
/// The merchandising `status` is set once here: `active` when the initial
/// stock exceeds 10, `inactive` otherwise. Later stock changes do not touch
/// it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn create_product(
    pool: &PgPool,
    product: &NewProduct<'_>,
    images: &[NewProductImage<'_>],
) -> Result<ProductRow, DbError> {
    let mut tx = pool.begin().await?;

    let category_id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(product.category_name)
    .fetch_one(&mut *tx)
    .await?;

    let status = if product.stock > 10 { "active" } else { "inactive" };

    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (category_id, name, description, price, stock, status) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, public_id, category_id, name, description, price, stock, status, \
                   created_at, updated_at",
    )
    .bind(category_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(status)
    .fetch_one(&mut *tx)
    .await?;

    let has_primary = images.iter().any(|img| img.is_primary);
    for (position, image) in images.iter().enumerate() {
        let is_primary = image.is_primary || (!has_primary && position == 0);
        sqlx::query(
            "INSERT INTO product_images (product_id, image_url, position, is_primary) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(row.id)
        .bind(image.image_url)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .bind(is_primary)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(row)
}
