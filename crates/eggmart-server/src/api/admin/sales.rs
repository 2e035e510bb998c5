//! Admin sale management: create, list, enable/disable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateSaleRequest {
    pub product_id: i64,
    pub sale_price: Decimal,
    pub quantity_available: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SaleItem {
    pub sale_id: i64,
    pub product_id: i64,
    pub original_price: Decimal,
    pub sale_price: Decimal,
    pub discount_percentage: i16,
    pub quantity_available: i32,
    pub quantity_sold: i32,
    pub remaining: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SetSaleStatusRequest {
    pub status: String,
}

fn sale_item(row: eggmart_db::SaleRow) -> SaleItem {
    let remaining = row.remaining();
    SaleItem {
        sale_id: row.id,
        product_id: row.product_id,
        original_price: row.original_price,
        sale_price: row.sale_price,
        discount_percentage: row.discount_percentage,
        quantity_available: row.quantity_available,
        quantity_sold: row.quantity_sold,
        remaining,
        start_date: row.start_date,
        end_date: row.end_date,
        status: row.status,
    }
}

/// POST /api/v1/admin/sales — create a time-bounded sale for a product.
///
/// `original_price` is snapshotted from the product and the discount
/// percentage derived from it.
pub(in crate::api) async fn create_sale(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SaleItem>>), ApiError> {
    let rid = &req_id.0;

    if body.sale_price <= Decimal::ZERO {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "sale_price must be positive",
        ));
    }
    if body.quantity_available < 1 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "quantity_available must be at least 1",
        ));
    }
    if body.end_date <= body.start_date {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "end_date must be after start_date",
        ));
    }

    let product = eggmart_db::get_product(&state.pool, body.product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    if body.sale_price >= product.price {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "sale_price must be below the product price",
        ));
    }

    let discount_percentage = ((product.price - body.sale_price) / product.price
        * Decimal::from(100))
    .round()
    .to_i16()
    .unwrap_or(0);

    let row = eggmart_db::create_sale(
        &state.pool,
        &eggmart_db::NewSale {
            product_id: product.id,
            original_price: product.price,
            sale_price: body.sale_price,
            discount_percentage,
            quantity_available: body.quantity_available,
            start_date: body.start_date,
            end_date: body.end_date,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: sale_item(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/admin/sales — all sales, newest first.
pub(in crate::api) async fn list_sales(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SaleItem>>>, ApiError> {
    let rows = eggmart_db::list_sales(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(sale_item).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/admin/sales/{id}/status — enable or disable a sale.
///
/// `expired` is owned by the lazy catalog sweep and cannot be set here.
pub(in crate::api) async fn set_sale_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(sale_id): Path<i64>,
    Json(body): Json<SetSaleStatusRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    if !matches!(body.status.as_str(), "active" | "inactive") {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "status must be 'active' or 'inactive'",
        ));
    }

    eggmart_db::set_sale_status(&state.pool, sale_id, &body.status)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "updated": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
