//! Admin notification buckets, each synthesized from its own query and
//! returned as a separate array; the UI merges them client-side.

use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const LOW_STOCK_THRESHOLD: i32 = 20;
const LOW_STOCK_LIMIT: i64 = 10;
const CRITICAL_STOCK_THRESHOLD: i32 = 10;
const CRITICAL_STOCK_LIMIT: i64 = 4;
const RECENT_REVIEW_LIMIT: i64 = 5;

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
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct NewOrderItem {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub total_amount: rust_decimal::Decimal,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ReminderItem {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct AdminNotificationsData {
    pub low_stock: Vec<LowStockItem>,
    pub critical_stock: Vec<LowStockItem>,
    pub recent_reviews: Vec<RecentReviewItem>,
    pub new_orders: Vec<NewOrderItem>,
    pub reminders: Vec<ReminderItem>,
}

fn low_stock_item(row: eggmart_db::LowStockRow) -> LowStockItem {
    LowStockItem {
        product_id: row.id,
        name: row.name,
        stock: row.stock,
        category_name: row.category_name,
    }
}

/// GET /api/v1/admin/notifications — the four admin buckets plus the
/// stricter overview-panel variant of low stock.
pub(in crate::api) async fn list_admin_notifications(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<AdminNotificationsData>>, ApiError> {
    let rid = &req_id.0;
    let pool = &state.pool;

    let low_stock = eggmart_db::list_low_stock_products(pool, LOW_STOCK_THRESHOLD, LOW_STOCK_LIMIT)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let critical_stock =
        eggmart_db::list_low_stock_products(pool, CRITICAL_STOCK_THRESHOLD, CRITICAL_STOCK_LIMIT)
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

    let data = AdminNotificationsData {
        low_stock: low_stock.into_iter().map(low_stock_item).collect(),
        critical_stock: critical_stock.into_iter().map(low_stock_item).collect(),
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
        new_orders: new_orders
            .into_iter()
            .map(|row| NewOrderItem {
                order_id: row.id,
                order_number: row.order_number,
                customer_name: row.customer_name,
                status: row.status,
                total_amount: row.total_amount,
                created_at: row.created_at,
            })
            .collect(),
        reminders: reminders
            .into_iter()
            .map(|row| ReminderItem {
                order_id: row.id,
                order_number: row.order_number,
                customer_name: row.customer_name,
                status: row.status,
                created_at: row.created_at,
            })
            .collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
