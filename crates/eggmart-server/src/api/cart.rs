//! The caller's cart, populated opportunistically at checkout.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::middleware::{AuthContext, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CartItem {
    pub product_id: i64,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// GET /api/v1/cart — the caller's cart with current prices.
pub(super) async fn list_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<CartItem>>>, ApiError> {
    let rows = eggmart_db::list_cart_items_for_user(&state.pool, auth.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| CartItem {
            product_id: row.product_id,
            product_name: row.product_name,
            price: row.price,
            quantity: row.quantity,
            updated_at: row.updated_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
