//! Checkout and the caller's order history.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use eggmart_core::DeliveryMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::{AuthContext, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CustomerInfoBody {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateOrderRequest {
    pub product_id: i64,
    pub quantity: i32,
    pub customer_info: CustomerInfoBody,
    pub delivery_method: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateOrderResponse {
    pub order_id: i64,
    pub order_number: String,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderSummaryItem {
    pub order_id: i64,
    pub order_number: String,
    pub status: String,
    pub delivery_method: String,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderListQuery {
    pub product_id: Option<i64>,
}

fn validate_customer_info(req_id: &str, info: &CustomerInfoBody) -> Result<(), ApiError> {
    for (field, value) in [
        ("name", &info.name),
        ("email", &info.email),
        ("phone", &info.phone),
        ("address", &info.address),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::new(
                req_id,
                "validation_error",
                format!("customer_info.{field} is required"),
            ));
        }
    }
    Ok(())
}

/// POST /api/v1/orders — checkout a single product.
pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateOrderResponse>>), ApiError> {
    let rid = &req_id.0;

    if body.quantity < 1 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "quantity must be at least 1",
        ));
    }
    validate_customer_info(rid, &body.customer_info)?;
    let Some(delivery_method) = DeliveryMethod::parse(&body.delivery_method) else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "delivery_method must be 'pickup' or 'delivery'",
        ));
    };
    if body.payment_method.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "payment_method is required",
        ));
    }

    let created = eggmart_db::create_order(
        &state.pool,
        &eggmart_db::NewOrder {
            user_id: auth.user_id,
            product_id: body.product_id,
            quantity: body.quantity,
            customer: eggmart_db::CustomerInfo {
                name: body.customer_info.name.trim(),
                email: body.customer_info.email.trim(),
                phone: body.customer_info.phone.trim(),
                address: body.customer_info.address.trim(),
            },
            delivery_method,
            payment_method: body.payment_method.trim(),
            notes: body.notes.as_deref(),
        },
        &state.fees,
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            ApiError::new(rid, "conflict", "order number collision, please retry")
        } else {
            map_db_error(rid.clone(), &e)
        }
    })?;

    // Best-effort cart bookkeeping; a failure here never fails the order.
    if let Err(e) =
        eggmart_db::upsert_cart_item(&state.pool, auth.user_id, body.product_id, body.quantity)
            .await
    {
        tracing::warn!(
            error = %e,
            user_id = auth.user_id,
            product_id = body.product_id,
            "cart upsert after checkout failed"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreateOrderResponse {
                order_id: created.order_id,
                order_number: created.order_number,
                subtotal: created.subtotal,
                delivery_fee: created.delivery_fee,
                total_amount: created.total_amount,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/orders — the caller's orders, optionally filtered to those
/// containing a product.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderSummaryItem>>>, ApiError> {
    let rows = eggmart_db::list_orders_for_user(&state.pool, auth.user_id, query.product_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| OrderSummaryItem {
            order_id: row.id,
            order_number: row.order_number,
            status: row.status,
            delivery_method: row.delivery_method,
            subtotal: row.subtotal,
            delivery_fee: row.delivery_fee,
            total_amount: row.total_amount,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
