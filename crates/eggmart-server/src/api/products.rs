//! Catalog listing (public) and product creation (admin).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Clone, Serialize)]
pub(super) struct SaleInfo {
    pub sale_id: i64,
    pub sale_price: Decimal,
    pub discount_percentage: i16,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct ProductItem {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_name: String,
    pub price: Decimal,
    pub stock: i32,
    /// Derived availability (`stock > 0`); independent of the merchandising
    /// `status` flag, which is set at creation and never recomputed.
    pub in_stock: bool,
    pub status: String,
    pub primary_image_url: Option<String>,
    pub sale: Option<SaleInfo>,
    pub rating_count: i64,
    pub avg_rating: Option<Decimal>,
}

/// GET /api/v1/products — catalog with sale and rating context.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let rows = eggmart_db::list_catalog(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| {
            let sale = match (row.sale_id, row.sale_price, row.discount_percentage) {
                (Some(sale_id), Some(sale_price), Some(discount_percentage)) => {
                    row.sale_ends_at.map(|ends_at| SaleInfo {
                        sale_id,
                        sale_price,
                        discount_percentage,
                        ends_at,
                    })
                }
                _ => None,
            };
            ProductItem {
                product_id: row.id,
                name: row.name,
                description: row.description,
                category_name: row.category_name,
                price: row.price,
                stock: row.stock,
                in_stock: row.stock > 0,
                status: row.status,
                primary_image_url: row.primary_image_url,
                sale,
                rating_count: row.rating_count,
                avg_rating: row.avg_rating,
            }
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct ProductImageItem {
    pub image_url: String,
    pub position: i32,
    pub is_primary: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub in_stock: bool,
    pub status: String,
    pub images: Vec<ProductImageItem>,
    pub sale: Option<SaleInfo>,
}

/// GET /api/v1/products/{id} — one product with images and its effective
/// sale.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let rid = &req_id.0;

    let product = eggmart_db::get_product(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let images = eggmart_db::list_product_images(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let sale = eggmart_db::get_effective_sale(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ProductDetail {
            product_id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            in_stock: product.stock > 0,
            status: product.status,
            images: images
                .into_iter()
                .map(|img| ProductImageItem {
                    image_url: img.image_url,
                    position: img.position,
                    is_primary: img.is_primary,
                })
                .collect(),
            sale: sale.map(|s| SaleInfo {
                sale_id: s.id,
                sale_price: s.sale_price,
                discount_percentage: s.discount_percentage,
                ends_at: s.end_date,
            }),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Creation (admin)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductImageBody {
    pub image_url: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductRequest {
    pub name: String,
    pub category_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<CreateProductImageBody>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateProductResponse {
    pub product_id: i64,
    pub name: String,
    pub status: String,
    pub stock: i32,
}

/// POST /api/v1/admin/products — create a product with images.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateProductResponse>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.len() > 200 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must be 1–200 characters",
        ));
    }
    let category_name = body.category_name.trim();
    if category_name.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "category_name is required",
        ));
    }
    if body.price <= Decimal::ZERO {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "price must be positive",
        ));
    }
    if body.stock < 0 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "stock must not be negative",
        ));
    }

    let images: Vec<eggmart_db::NewProductImage<'_>> = body
        .images
        .iter()
        .map(|img| eggmart_db::NewProductImage {
            image_url: &img.image_url,
            is_primary: img.is_primary,
        })
        .collect();

    let row = eggmart_db::create_product(
        &state.pool,
        &eggmart_db::NewProduct {
            name,
            category_name,
            price: body.price,
            stock: body.stock,
            description: body.description.as_deref(),
        },
        &images,
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreateProductResponse {
                product_id: row.id,
                name: row.name,
                status: row.status,
                stock: row.stock,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_item_is_serializable() {
        let item = ProductItem {
            product_id: 1,
            name: "Dozen Eggs".to_string(),
            description: None,
            category_name: "Eggs".to_string(),
            price: Decimal::new(12_50, 2),
            stock: 0,
            in_stock: false,
            status: "active".to_string(),
            primary_image_url: None,
            sale: None,
            rating_count: 0,
            avg_rating: None,
        };
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["price"].as_str(), Some("12.50"));
        assert_eq!(json["in_stock"].as_bool(), Some(false));
        // Merchandising flag is reported as stored, even at zero stock.
        assert_eq!(json["status"].as_str(), Some("active"));
        assert!(json["sale"].is_null());
    }
}
