//! Shared helpers for route integration tests: app construction, auth
//! cookies, and row seeding.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use eggmart_core::FeeSchedule;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use crate::api::{build_app, AppState};
use crate::middleware::AuthState;

pub(crate) const TEST_SECRET: &str = "test-secret";

pub(crate) fn test_app(pool: PgPool) -> Router {
    let auth = AuthState::new(pool.clone(), TEST_SECRET);
    build_app(
        AppState {
            pool,
            fees: FeeSchedule::default(),
        },
        auth,
    )
}

pub(crate) fn auth_cookie(pool: &PgPool, user_id: i64) -> String {
    let auth = AuthState::new(pool.clone(), TEST_SECRET);
    let token = auth
        .issue_token(user_id, Duration::hours(1))
        .expect("issue token");
    format!("auth_token={token}")
}

pub(crate) async fn seed_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    eggmart_db::create_user(
        pool,
        "Test User",
        email,
        Some("555-0100"),
        Some("1 Coop Lane"),
        role,
    )
    .await
    .expect("seed user")
    .id
}

/// Inserts a product directly, with an explicit `active` status regardless
/// of stock — the flag is set at creation in the product-creation path and
/// never recomputed, so purchasable low-stock products are a normal state.
pub(crate) async fn seed_product(pool: &PgPool, name: &str, price: &str, stock: i32) -> i64 {
    let category_id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (name) VALUES ('Eggs') \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("seed category");

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (category_id, name, price, stock, status) \
         VALUES ($1, $2, $3::numeric(10,2), $4, 'active') \
         RETURNING id",
    )
    .bind(category_id)
    .bind(name)
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("seed product")
}

/// Inserts an order with a single line item in the given status, priced
/// from the product row.
pub(crate) async fn seed_order(
    pool: &PgPool,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    status: &str,
) -> i64 {
    let order_number = format!("EGG{}", &Uuid::new_v4().simple().to_string()[..9]);

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders \
             (user_id, order_number, customer_name, customer_email, customer_phone, \
              customer_address, delivery_method, payment_method, subtotal, delivery_fee, \
              total_amount, status) \
         SELECT $1, $2, 'Test Customer', 'customer@example.com', '555-0100', '1 Coop Lane', \
                'pickup', 'cod', p.price * $3, 0, p.price * $3, $4 \
         FROM products p WHERE p.id = $5 \
         RETURNING id",
    )
    .bind(user_id)
    .bind(&order_number)
    .bind(quantity)
    .bind(status)
    .bind(product_id)
    .fetch_one(pool)
    .await
    .expect("seed order");

    sqlx::query(
        "INSERT INTO order_items \
             (order_id, product_id, product_name, product_price, quantity, total_price) \
         SELECT $1, p.id, p.name, p.price, $2, p.price * $2 \
         FROM products p WHERE p.id = $3",
    )
    .bind(order_id)
    .bind(quantity)
    .bind(product_id)
    .execute(pool)
    .await
    .expect("seed order item");

    order_id
}

pub(crate) async fn seed_sale(
    pool: &PgPool,
    product_id: i64,
    sale_price: &str,
    quantity_available: i32,
    quantity_sold: i32,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO sales \
             (product_id, original_price, sale_price, discount_percentage, \
              quantity_available, quantity_sold, start_date, end_date, status) \
         SELECT p.id, p.price, $1::numeric(10,2), 20, $2, $3, \
                NOW() - INTERVAL '1 day', NOW() + INTERVAL '1 day', 'active' \
         FROM products p WHERE p.id = $4 \
         RETURNING id",
    )
    .bind(sale_price)
    .bind(quantity_available)
    .bind(quantity_sold)
    .bind(product_id)
    .fetch_one(pool)
    .await
    .expect("seed sale")
}

pub(crate) async fn product_stock(pool: &PgPool, product_id: i64) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("read stock")
}

pub(crate) async fn sale_quantity_sold(pool: &PgPool, sale_id: i64) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT quantity_sold FROM sales WHERE id = $1")
        .bind(sale_id)
        .fetch_one(pool)
        .await
        .expect("read quantity_sold")
}

/// Sends one request through the router and returns the status plus parsed
/// JSON body.
pub(crate) async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("encode body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json parse")
    };

    (status, json)
}
