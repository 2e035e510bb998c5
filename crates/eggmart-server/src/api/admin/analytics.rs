//! Admin dashboard: one payload aggregating counters, revenue breakdowns,
//! and the notification buckets.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const RECENT_ORDER_LIMIT: i64 = 5;
const LOW_STOCK_THRESHOLD: i32 = 20;
const LOW_STOCK_LIMIT: i64 = 10;
const RECENT_REVIEW_LIMIT: i64 = 5;
const REVENUE_MONTHS: i32 = 6;

#[derive(Debug, Serialize)]
pub(in crate::api) struct DashboardTotals {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub pending_orders: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RecentOrderItem {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct MonthlyRevenueItem {
    pub month: DateTime<Utc>,
    pub revenue: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CategoryRevenueItem {
    pub category_name: String,
    pub revenue: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct LowStockItem {
    pub product_id: i64,
    pub name: String,
    pub stock: i32,
    pub category_name: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RecentReviewItem {
    pub rating_id: i64,
    pub rating: i16,
    pub review_text: Option<String>,
    pub product_name: String,
    pub reviewer_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct DashboardData {
    pub totals: DashboardTotals,
    pub recent_orders: Vec<RecentOrderItem>,
    pub low_stock: Vec<LowStockItem>,
    pub monthly_revenue: Vec<MonthlyRevenueItem>,
    pub revenue_by_category: Vec<CategoryRevenueItem>,
    pub recent_reviews: Vec<RecentReviewItem>,
    pub new_order_count: usize,
    pub reminder_count: usize,
}

/// GET /api/v1/admin/analytics — the full dashboard payload.
pub(in crate::api) async fn dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardData>>, ApiError> {
    let rid = &req_id.0;
    let pool = &state.pool;

    let counts = eggmart_db::dashboard_counts(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let recent_orders = eggmart_db::list_recent_orders(pool, RECENT_ORDER_LIMIT)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let low_stock = eggmart_db::list_low_stock_products(pool, LOW_STOCK_THRESHOLD, LOW_STOCK_LIMIT)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let monthly = eggmart_db::monthly_revenue(pool, REVENUE_MONTHS)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let by_category = eggmart_db::revenue_by_category(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let recent_reviews = eggmart_db::list_recent_reviews(pool, RECENT_REVIEW_LIMIT)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let new_orders = eggmart_db::list_new_orders_since(pool, Utc::now() - Duration::hours(24))
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let reminders = eggmart_db::list_stale_order_reminders(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let data = DashboardData {
        totals: DashboardTotals {
            total_products: counts.total_products,
            total_orders: counts.total_orders,
            total_customers: counts.total_customers,
            pending_orders: counts.pending_orders,
            total_revenue: counts.total_revenue,
        },
        recent_orders: recent_orders
            .into_iter()
            .map(|row| RecentOrderItem {
                order_id: row.id,
                order_number: row.order_number,
                customer_name: row.customer_name,
                status: row.status,
                total_amount: row.total_amount,
                created_at: row.created_at,
            })
            .collect(),
        low_stock: low_stock
            .into_iter()
            .map(|row| LowStockItem {
                product_id: row.id,
                name: row.name,
                stock: row.stock,
                category_name: row.category_name,
            })
            .collect(),
        monthly_revenue: monthly
            .into_iter()
            .map(|row| MonthlyRevenueItem {
                month: row.month,
                revenue: row.revenue,
                order_count: row.order_count,
            })
            .collect(),
        revenue_by_category: by_category
            .into_iter()
            .map(|row| CategoryRevenueItem {
                category_name: row.category_name,
                revenue: row.revenue,
                order_count: row.order_count,
            })
            .collect(),
        recent_reviews: recent_reviews
            .into_iter()
            .map(|row| RecentReviewItem {
                rating_id: row.rating_id,
                rating: row.rating,
                review_text: row.review_text,
                product_name: row.product_name,
                reviewer_name: row.reviewer_name,
                created_at: row.created_at,
            })
            .collect(),
        new_order_count: new_orders.len(),
        reminder_count: reminders.len(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
