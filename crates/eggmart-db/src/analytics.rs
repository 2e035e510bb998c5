//! Read-model queries for the admin dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Headline counters for the dashboard. Revenue covers all non-cancelled
/// orders.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DashboardCounts {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub pending_orders: i64,
    pub total_revenue: Decimal,
}

/// Revenue and order count for one calendar month.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyRevenueRow {
    pub month: DateTime<Utc>,
    pub revenue: Decimal,
    pub order_count: i64,
}

/// Revenue attributed to one product category.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRevenueRow {
    pub category_name: String,
    pub revenue: Decimal,
    pub order_count: i64,
}

/// Returns the dashboard's headline counters in one round-trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn dashboard_counts(pool: &PgPool) -> Result<DashboardCounts, DbError> {
    let row = sqlx::query_as::<_, DashboardCounts>(
        "SELECT \
             (SELECT COUNT(*) FROM products) AS total_products, \
             (SELECT COUNT(*) FROM orders) AS total_orders, \
             (SELECT COUNT(*) FROM users WHERE role = 'customer') AS total_customers, \
             (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders, \
             (SELECT COALESCE(SUM(total_amount), 0)::numeric(12,2) \
              FROM orders WHERE status <> 'cancelled') AS total_revenue",
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Revenue per calendar month over the trailing `months` months, oldest
/// first. Cancelled orders are excluded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn monthly_revenue(
    pool: &PgPool,
    months: i32,
) -> Result<Vec<MonthlyRevenueRow>, DbError> {
    let rows = sqlx::query_as::<_, MonthlyRevenueRow>(
        "SELECT date_trunc('month', created_at) AS month, \
                SUM(total_amount)::numeric(12,2) AS revenue, \
                COUNT(*) AS order_count \
         FROM orders \
         WHERE status <> 'cancelled' \
           AND created_at >= date_trunc('month', NOW()) - ($1 - 1) * INTERVAL '1 month' \
         GROUP BY 1 \
         ORDER BY 1",
    )
    .bind(months)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Revenue grouped by product category, largest first. Cancelled orders are
/// excluded; revenue is summed over line items so multi-item orders split
/// correctly across categories.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn revenue_by_category(pool: &PgPool) -> Result<Vec<CategoryRevenueRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRevenueRow>(
        "SELECT c.name AS category_name, \
                SUM(oi.total_price)::numeric(12,2) AS revenue, \
                COUNT(DISTINCT o.id) AS order_count \
         FROM order_items oi \
         JOIN orders o ON o.id = oi.order_id \
         JOIN products p ON p.id = oi.product_id \
         JOIN categories c ON c.id = p.category_id \
         WHERE o.status <> 'cancelled' \
         GROUP BY c.name \
         ORDER BY revenue DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
