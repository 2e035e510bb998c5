//! Post-delivery order ratings with photo attachments.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use eggmart_core::ratings::{rating_in_bounds, MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};

use crate::middleware::{AuthContext, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RatingImageBody {
    pub image_url: Option<String>,
    pub image_name: Option<String>,
    pub image_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateRatingRequest {
    pub order_id: i64,
    pub rating: i16,
    pub review_text: Option<String>,
    #[serde(default)]
    pub images: Vec<RatingImageBody>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateRatingResponse {
    pub rating_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct RatingImageItem {
    pub image_url: String,
    pub image_name: String,
    pub image_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct RatingItem {
    pub rating_id: i64,
    pub rating: i16,
    pub review_text: Option<String>,
    pub reviewer_name: String,
    pub is_own: bool,
    pub images: Vec<RatingImageItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct RatingListData {
    pub ratings: Vec<RatingItem>,
    pub own_rating: Option<RatingItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RatingQuery {
    pub order_id: Option<i64>,
}

fn require_order_id(req_id: &str, query: &RatingQuery) -> Result<i64, ApiError> {
    query.order_id.ok_or_else(|| {
        ApiError::new(req_id, "validation_error", "order_id query parameter is required")
    })
}

/// POST /api/v1/ratings — rate a delivered order, once per (user, order).
pub(super) async fn create_rating(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateRatingResponse>>), ApiError> {
    let rid = &req_id.0;

    if !rating_in_bounds(body.rating) {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
        ));
    }

    // Attachments missing any field are silently skipped, not reported as
    // partial failures.
    let images: Vec<eggmart_db::NewRatingImage<'_>> = body
        .images
        .iter()
        .filter_map(|img| {
            let image_url = img.image_url.as_deref().filter(|s| !s.is_empty())?;
            let image_name = img.image_name.as_deref().filter(|s| !s.is_empty())?;
            let image_size = img.image_size.filter(|size| *size > 0)?;
            Some(eggmart_db::NewRatingImage {
                image_url,
                image_name,
                image_size,
            })
        })
        .collect();

    let rating_id = eggmart_db::create_rating(
        &state.pool,
        auth.user_id,
        body.order_id,
        body.rating,
        body.review_text.as_deref().filter(|s| !s.trim().is_empty()),
        &images,
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            ApiError::new(rid, "conflict", "you have already rated this order")
        } else {
            map_db_error(rid.clone(), &e)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreateRatingResponse { rating_id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/ratings?order_id= — all ratings for an order plus the
/// caller's own, if any.
pub(super) async fn list_ratings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<ApiResponse<RatingListData>>, ApiError> {
    let rid = &req_id.0;
    let order_id = require_order_id(rid, &query)?;

    let rows = eggmart_db::list_ratings_for_order(&state.pool, order_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let image_rows = eggmart_db::list_rating_images_for_order(&state.pool, order_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let ratings: Vec<RatingItem> = rows
        .into_iter()
        .map(|row| {
            let images = image_rows
                .iter()
                .filter(|img| img.order_rating_id == row.id)
                .map(|img| RatingImageItem {
                    image_url: img.image_url.clone(),
                    image_name: img.image_name.clone(),
                    image_size: img.image_size,
                })
                .collect();
            RatingItem {
                rating_id: row.id,
                rating: row.rating,
                review_text: row.review_text,
                reviewer_name: row.reviewer_name,
                is_own: row.user_id == auth.user_id,
                images,
                created_at: row.created_at,
            }
        })
        .collect();

    let own_rating = ratings.iter().find(|item| item.is_own).cloned();

    Ok(Json(ApiResponse {
        data: RatingListData {
            ratings,
            own_rating,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/ratings?order_id= — remove the caller's rating.
pub(super) async fn delete_rating(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let order_id = require_order_id(rid, &query)?;

    eggmart_db::delete_rating(&state.pool, auth.user_id, order_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
