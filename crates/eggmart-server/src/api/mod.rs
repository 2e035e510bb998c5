mod admin;
mod cart;
mod notifications;
mod orders;
mod products;
mod ratings;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use eggmart_core::FeeSchedule;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_admin, require_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub fees: FeeSchedule,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" | "insufficient_stock" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

/// Maps database errors onto the API error envelope. Domain failures keep
/// their message; driver failures are logged and collapsed to a generic 500.
pub(super) fn map_db_error(request_id: String, error: &eggmart_db::DbError) -> ApiError {
    use eggmart_db::DbError;

    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        DbError::ProductUnavailable { .. } => ApiError::new(
            request_id,
            "not_found",
            "product is not available for purchase",
        ),
        DbError::InsufficientStock { .. } | DbError::SaleSoldOut { .. } => {
            ApiError::new(request_id, "insufficient_stock", error.to_string())
        }
        DbError::OrderNotDelivered { .. } => ApiError::new(
            request_id,
            "validation_error",
            "only delivered orders can be rated",
        ),
        _ => {
            tracing::error!(error = %error, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::COOKIE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn customer_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/v1/cart", get(cart::list_cart))
        .route(
            "/api/v1/ratings",
            post(ratings::create_rating)
                .get(ratings::list_ratings)
                .delete(ratings::delete_rating),
        )
        .route(
            "/api/v1/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            post(notifications::mark_read),
        )
}

fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/products", post(products::create_product))
        .route("/api/v1/admin/orders", get(admin::orders::list_orders))
        .route(
            "/api/v1/admin/orders/{id}",
            get(admin::orders::get_order).put(admin::orders::update_order_status),
        )
        .route(
            "/api/v1/admin/sales",
            get(admin::sales::list_sales).post(admin::sales::create_sale),
        )
        .route(
            "/api/v1/admin/sales/{id}/status",
            put(admin::sales::set_sale_status),
        )
        .route(
            "/api/v1/admin/notifications",
            get(admin::notifications::list_admin_notifications),
        )
        .route("/api/v1/admin/analytics", get(admin::analytics::dashboard))
        .layer(axum::middleware::from_fn(require_admin))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{id}", get(products::get_product));

    let protected_routes = Router::new()
        .merge(customer_router())
        .merge(admin_router())
        .layer(axum::middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match eggmart_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_insufficient_stock_maps_to_conflict() {
        let response = ApiError::new("req-1", "insufficient_stock", "short").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn map_db_error_keeps_stock_shortfall_message() {
        let err = eggmart_db::DbError::InsufficientStock {
            product_id: 1,
            product_name: "Dozen Eggs".to_string(),
            available: 2,
            required: 5,
        };
        let api_error = map_db_error("req-1".to_string(), &err);
        assert_eq!(api_error.error.code, "insufficient_stock");
        assert!(
            api_error.error.message.contains("Available: 2, Required: 5"),
            "got: {}",
            api_error.error.message
        );
    }
}
