//! Customer notification feed: persisted rows merged with sale promos
//! synthesized at read time.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::middleware::{AuthContext, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// One feed entry. Persisted rows carry numeric ids and server-side read
/// state; synthesized promos exist only at read time, with string ids and
/// no read state. The tag keeps clients from conflating the two.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub(super) enum CustomerNotification {
    Persisted {
        id: i64,
        kind: String,
        title: String,
        message: String,
        order_id: Option<i64>,
        product_id: Option<i64>,
        is_read: bool,
        created_at: DateTime<Utc>,
    },
    Synthesized {
        id: String,
        kind: String,
        title: String,
        message: String,
        product_id: i64,
        sale_price: Decimal,
        ends_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    },
}

impl CustomerNotification {
    fn created_at(&self) -> DateTime<Utc> {
        match self {
            CustomerNotification::Persisted { created_at, .. }
            | CustomerNotification::Synthesized { created_at, .. } => *created_at,
        }
    }
}

/// GET /api/v1/notifications — persisted rows plus active sale promos,
/// newest first.
pub(super) async fn list_notifications(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<CustomerNotification>>>, ApiError> {
    let rid = &req_id.0;

    let persisted = eggmart_db::list_notifications_for_user(&state.pool, auth.user_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let promos = eggmart_db::list_sale_promos(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let mut data: Vec<CustomerNotification> = persisted
        .into_iter()
        .map(|row| CustomerNotification::Persisted {
            id: row.id,
            kind: row.kind,
            title: row.title,
            message: row.message,
            order_id: row.order_id,
            product_id: row.product_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
        .chain(promos.into_iter().map(|promo| {
            CustomerNotification::Synthesized {
                id: format!("sale-{}", promo.sale_id),
                kind: "sale".to_string(),
                title: format!(
                    "{}% off {}",
                    promo.discount_percentage, promo.product_name
                ),
                message: format!(
                    "{} is on sale for {} (was {}) until {}",
                    promo.product_name,
                    promo.sale_price,
                    promo.original_price,
                    promo.end_date.format("%Y-%m-%d")
                ),
                product_id: promo.product_id,
                sale_price: promo.sale_price,
                ends_at: promo.end_date,
                created_at: promo.created_at,
            }
        }))
        .collect();

    data.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/notifications/{id}/read — mark a persisted row read.
///
/// Synthesized promos have no server-side read state; their string ids
/// never reach this route.
pub(super) async fn mark_read(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(auth): Extension<AuthContext>,
    Path(notification_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    eggmart_db::mark_notification_read(&state.pool, auth.user_id, notification_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "read": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_and_synthesized_entries_are_tagged() {
        let persisted = CustomerNotification::Persisted {
            id: 7,
            kind: "order_status".to_string(),
            title: "Order shipped".to_string(),
            message: "Your order is on its way.".to_string(),
            order_id: Some(3),
            product_id: None,
            is_read: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&persisted).expect("serialize");
        assert_eq!(json["source"].as_str(), Some("persisted"));
        assert_eq!(json["id"].as_i64(), Some(7));
        assert_eq!(json["is_read"].as_bool(), Some(false));

        let synthesized = CustomerNotification::Synthesized {
            id: "sale-9".to_string(),
            kind: "sale".to_string(),
            title: "20% off Dozen Eggs".to_string(),
            message: "Dozen Eggs is on sale".to_string(),
            product_id: 2,
            sale_price: Decimal::new(8_00, 2),
            ends_at: Utc::now(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&synthesized).expect("serialize");
        assert_eq!(json["source"].as_str(), Some("synthesized"));
        assert_eq!(json["id"].as_str(), Some("sale-9"));
        assert!(json.get("is_read").is_none());
    }
}
