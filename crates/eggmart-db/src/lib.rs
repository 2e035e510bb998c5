use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/eggmart-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &eggmart_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("product {product_id} is not available for purchase")]
    ProductUnavailable { product_id: i64 },
    #[error(
        "insufficient stock for {product_name}. Available: {available}, Required: {required}"
    )]
    InsufficientStock {
        product_id: i64,
        product_name: String,
        available: i32,
        required: i32,
    },
    #[error("sale {sale_id} has {remaining} units remaining, required {required}")]
    SaleSoldOut {
        sale_id: i64,
        remaining: i32,
        required: i32,
    },
    #[error("order {order_id} is not delivered and cannot be rated")]
    OrderNotDelivered { order_id: i64 },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// True when the underlying driver error is a Postgres unique-constraint
    /// violation (SQLSTATE 23505).
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DbError::Sqlx(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505")
        )
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_has_sane_defaults() {
        let config = PoolConfig::default();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }
}

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod notifications;
pub mod orders;
pub mod ratings;
pub mod sales;
pub mod users;

pub use analytics::{
    dashboard_counts, monthly_revenue, revenue_by_category, CategoryRevenueRow, DashboardCounts,
    MonthlyRevenueRow,
};
pub use cart::{list_cart_items_for_user, upsert_cart_item, CartItemRow};
pub use catalog::{
    create_product, get_product, list_catalog, list_product_images, CatalogRow, NewProduct,
    NewProductImage, ProductImageRow, ProductRow,
};
pub use notifications::{
    insert_notification, list_low_stock_products, list_new_orders_since,
    list_notifications_for_user, list_recent_reviews, list_sale_promos,
    list_stale_order_reminders, mark_notification_read, LowStockRow, NewOrderRow,
    NotificationRow, RecentReviewRow, SalePromoRow, StaleOrderRow,
};
pub use orders::{
    create_order, get_order_with_items, list_orders_for_user, list_recent_orders,
    transition_order_status, CreatedOrder, CustomerInfo, NewOrder, OrderItemRow, OrderRow,
    StatusTransition,
};
pub use ratings::{
    create_rating, delete_rating, list_rating_images_for_order, list_ratings_for_order,
    NewRatingImage, RatingImageRow, RatingRow,
};
pub use sales::{
    create_sale, expire_stale_sales, get_effective_sale, list_sales, set_sale_status, NewSale,
    SaleRow,
};
pub use users::{create_user, get_user_auth, UserAuthRow, UserRow};
