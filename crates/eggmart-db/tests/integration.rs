//! Offline unit tests for eggmart-db pool configuration, error mapping,
//! and row types. These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Utc;
use eggmart_core::{AppConfig, Environment};
use eggmart_db::{DbError, OrderRow, PoolConfig, SaleRow};
use rust_decimal::Decimal;
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        auth_secret: "secret".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        free_delivery_threshold: Decimal::from(500),
        delivery_fee: Decimal::from(50),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`OrderRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn order_row_has_expected_fields() {
    let row = OrderRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        user_id: 2_i64,
        order_number: "EGG123456789".to_string(),
        customer_name: "Ada".to_string(),
        customer_email: "ada@example.com".to_string(),
        customer_phone: "555-0100".to_string(),
        customer_address: "1 Coop Lane".to_string(),
        delivery_method: "pickup".to_string(),
        payment_method: "cod".to_string(),
        subtotal: Decimal::new(30_00, 2),
        delivery_fee: Decimal::ZERO,
        total_amount: Decimal::new(30_00, 2),
        notes: None,
        status: "pending".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.order_number, "EGG123456789");
    assert_eq!(row.status, "pending");
    assert_eq!(row.subtotal, row.total_amount);
    assert!(row.notes.is_none());
}

#[test]
fn sale_row_remaining_subtracts_sold() {
    let row = SaleRow {
        id: 1,
        product_id: 2,
        original_price: Decimal::new(10_00, 2),
        sale_price: Decimal::new(8_00, 2),
        discount_percentage: 20,
        quantity_available: 10,
        quantity_sold: 7,
        start_date: Utc::now(),
        end_date: Utc::now(),
        status: "active".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.remaining(), 3);
}

#[test]
fn insufficient_stock_error_names_available_and_required() {
    let err = DbError::InsufficientStock {
        product_id: 7,
        product_name: "Dozen Eggs".to_string(),
        available: 2,
        required: 5,
    };

    let message = err.to_string();
    assert!(message.contains("Available: 2"), "got: {message}");
    assert!(message.contains("Required: 5"), "got: {message}");
    assert!(message.contains("Dozen Eggs"), "got: {message}");
}
