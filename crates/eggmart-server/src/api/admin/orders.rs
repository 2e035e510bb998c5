//! Admin order management: listing, detail, and status transitions with
//! stock reconciliation.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use eggmart_core::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(in crate::api) struct AdminOrderItem {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct OrderLineItem {
    pub product_id: i64,
    pub product_name: String,
    pub product_price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct OrderDetail {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub delivery_method: String,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineItem>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AdminOrderListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct UpdateOrderStatusResponse {
    pub message: String,
    pub previous_status: String,
    pub status: String,
    pub stock_updated: bool,
}

/// GET /api/v1/admin/orders — recent orders across all users.
pub(in crate::api) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AdminOrderListQuery>,
) -> Result<Json<ApiResponse<Vec<AdminOrderItem>>>, ApiError> {
    let rows = eggmart_db::list_recent_orders(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| AdminOrderItem {
            order_id: row.id,
            order_number: row.order_number,
            customer_name: row.customer_name,
            status: row.status,
            total_amount: row.total_amount,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/admin/orders/{id} — full order with line items.
pub(in crate::api) async fn get_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(order_id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetail>>, ApiError> {
    let (order, items) = eggmart_db::get_order_with_items(&state.pool, order_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = items
        .into_iter()
        .map(|item| OrderLineItem {
            product_id: item.product_id,
            product_name: item.product_name,
            product_price: item.product_price,
            quantity: item.quantity,
            total_price: item.total_price,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: OrderDetail {
            order_id: order.id,
            order_number: order.order_number,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            delivery_method: order.delivery_method,
            payment_method: order.payment_method,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total_amount: order.total_amount,
            notes: order.notes,
            status: order.status,
            created_at: order.created_at,
            items,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/admin/orders/{id} — transition an order's status.
///
/// Crossing the cancelled boundary restores or re-deducts stock inside the
/// transition; an actual change also emits a best-effort notification to
/// the order's owner.
pub(in crate::api) async fn update_order_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(order_id): Path<i64>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<UpdateOrderStatusResponse>>, ApiError> {
    let rid = &req_id.0;

    let Some(new_status) = OrderStatus::parse(&body.status) else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "status must be one of pending, confirmed, processing, shipped, delivered, cancelled",
        ));
    };

    let transition = eggmart_db::transition_order_status(&state.pool, order_id, new_status)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let changed = transition.previous_status != new_status.as_str();
    if changed {
        let (title, message) = new_status.notification_copy();
        if let Err(e) = eggmart_db::insert_notification(
            &state.pool,
            transition.user_id,
            "order_status",
            title,
            message,
            Some(order_id),
            None,
        )
        .await
        {
            tracing::warn!(
                error = %e,
                order_id,
                user_id = transition.user_id,
                "status notification insert failed"
            );
        }
    }

    let message = if changed {
        format!("order status updated to {new_status}")
    } else {
        "order status unchanged".to_string()
    };

    Ok(Json(ApiResponse {
        data: UpdateOrderStatusResponse {
            message,
            previous_status: transition.previous_status,
            status: new_status.as_str().to_string(),
            stock_updated: transition.stock_updated,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
