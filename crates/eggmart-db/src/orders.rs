//! Database operations for `orders` and `order_items`: checkout and the
//! status-transition / stock-reconciliation flow.

use chrono::{DateTime, Utc};
use eggmart_core::{generate_order_number, DeliveryMethod, FeeSchedule, OrderStatus};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: i64,
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
    pub updated_at: DateTime<Utc>,
}

/// A row from the `order_items` table. `product_name` and `product_price`
/// are snapshots taken at checkout.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
}

/// Customer snapshot captured at checkout; denormalized onto the order and
/// never re-synced from the profile.
#[derive(Debug, Clone)]
pub struct CustomerInfo<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
}

/// Checkout input: single-product orders only (the schema allows more items
/// per order; the creation path writes exactly one).
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub customer: CustomerInfo<'a>,
    pub delivery_method: DeliveryMethod,
    pub payment_method: &'a str,
    pub notes: Option<&'a str>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order_id: i64,
    pub order_number: String,
    pub unit_price: Decimal,
    pub on_sale: bool,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
}

/// Result of an admin status transition.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub order_id: i64,
    pub user_id: i64,
    pub previous_status: String,
    pub new_status: OrderStatus,
    /// True when the transition crossed the cancelled boundary and stock
    /// was restored or re-deducted.
    pub stock_updated: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductForPurchase {
    id: i64,
    name: String,
    price: Decimal,
    stock: i32,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleForPurchase {
    id: i64,
    sale_price: Decimal,
    quantity_available: i32,
    quantity_sold: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderForTransition {
    id: i64,
    user_id: i64,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemForReconciliation {
    product_id: i64,
    product_name: String,
    quantity: i32,
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// Creates an order with exactly one line item and decrements inventory,
/// all inside one transaction.
///
/// The product row is locked with `FOR UPDATE` for the duration, so the
/// stock check and the decrement cannot interleave with a concurrent
/// checkout of the same product. When an effectively-active sale exists it
/// is locked too; the unit price becomes the sale price and the requested
/// quantity is checked against the sale's remaining availability
/// (`quantity_available - quantity_sold`).
///
/// The decrement statements still carry conditional `WHERE` guards and
/// affected-row checks, so stock can never go negative even if the
/// preceding reads were somehow stale.
///
/// # Errors
///
/// - [`DbError::NotFound`] — product does not exist.
/// - [`DbError::ProductUnavailable`] — product status is not `active`.
/// - [`DbError::InsufficientStock`] — requested quantity exceeds stock.
/// - [`DbError::SaleSoldOut`] — requested quantity exceeds the sale's
///   remaining availability.
/// - [`DbError::Sqlx`] — any statement failed (including an order-number
///   unique violation).
pub async fn create_order(
    pool: &PgPool,
    new_order: &NewOrder<'_>,
    fees: &FeeSchedule,
) -> Result<CreatedOrder, DbError> {
    let mut tx = pool.begin().await?;

    let product = sqlx::query_as::<_, ProductForPurchase>(
        "SELECT id, name, price, stock, status \
         FROM products \
         WHERE id = $1 \
         FOR UPDATE",
    )
    .bind(new_order.product_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    if product.status != "active" {
        return Err(DbError::ProductUnavailable {
            product_id: product.id,
        });
    }

    let sale = sqlx::query_as::<_, SaleForPurchase>(
        "SELECT id, sale_price, quantity_available, quantity_sold \
         FROM sales \
         WHERE product_id = $1 \
           AND status = 'active' \
           AND NOW() BETWEEN start_date AND end_date \
         ORDER BY id DESC \
         LIMIT 1 \
         FOR UPDATE",
    )
    .bind(product.id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(ref sale) = sale {
        let remaining = sale.quantity_available - sale.quantity_sold;
        if new_order.quantity > remaining {
            return Err(DbError::SaleSoldOut {
                sale_id: sale.id,
                remaining,
                required: new_order.quantity,
            });
        }
    }

    if new_order.quantity > product.stock {
        return Err(DbError::InsufficientStock {
            product_id: product.id,
            product_name: product.name.clone(),
            available: product.stock,
            required: new_order.quantity,
        });
    }

    let unit_price = sale.as_ref().map_or(product.price, |s| s.sale_price);
    let subtotal = unit_price * Decimal::from(new_order.quantity);
    let delivery_fee = fees.fee_for(new_order.delivery_method, subtotal);
    let total_amount = subtotal + delivery_fee;
    let order_number = generate_order_number();

    let order_id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders \
             (user_id, order_number, customer_name, customer_email, customer_phone, \
              customer_address, delivery_method, payment_method, subtotal, delivery_fee, \
              total_amount, notes, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending') \
         RETURNING id",
    )
    .bind(new_order.user_id)
    .bind(&order_number)
    .bind(new_order.customer.name)
    .bind(new_order.customer.email)
    .bind(new_order.customer.phone)
    .bind(new_order.customer.address)
    .bind(new_order.delivery_method.as_str())
    .bind(new_order.payment_method)
    .bind(subtotal)
    .bind(delivery_fee)
    .bind(total_amount)
    .bind(new_order.notes)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO order_items \
             (order_id, product_id, product_name, product_price, quantity, total_price) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(order_id)
    .bind(product.id)
    .bind(&product.name)
    .bind(unit_price)
    .bind(new_order.quantity)
    .bind(subtotal)
    .execute(&mut *tx)
    .await?;

    let stock_update = sqlx::query(
        "UPDATE products \
         SET stock = stock - $1, updated_at = NOW() \
         WHERE id = $2 AND stock >= $1",
    )
    .bind(new_order.quantity)
    .bind(product.id)
    .execute(&mut *tx)
    .await?;

    if stock_update.rows_affected() == 0 {
        return Err(DbError::InsufficientStock {
            product_id: product.id,
            product_name: product.name,
            available: product.stock,
            required: new_order.quantity,
        });
    }

    if let Some(ref sale) = sale {
        let sold_update = sqlx::query(
            "UPDATE sales \
             SET quantity_sold = quantity_sold + $1, updated_at = NOW() \
             WHERE id = $2 AND quantity_available - quantity_sold >= $1",
        )
        .bind(new_order.quantity)
        .bind(sale.id)
        .execute(&mut *tx)
        .await?;

        if sold_update.rows_affected() == 0 {
            return Err(DbError::SaleSoldOut {
                sale_id: sale.id,
                remaining: sale.quantity_available - sale.quantity_sold,
                required: new_order.quantity,
            });
        }
    }

    tx.commit().await?;

    Ok(CreatedOrder {
        order_id,
        order_number,
        unit_price,
        on_sale: sale.is_some(),
        subtotal,
        delivery_fee,
        total_amount,
    })
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Transitions an order to `new_status`, reconciling inventory when the
/// cancelled boundary is crossed. Runs in one transaction with the order
/// row locked.
///
/// - Any status into `cancelled`: every item's stock is restored
///   (`stock + quantity`). Sale `quantity_sold` is deliberately NOT
///   reversed.
/// - `cancelled` into any other status: every item is conditionally
///   re-deducted (`stock - quantity WHERE stock >= quantity`); the first
///   shortfall aborts the whole transaction, so no item's stock moves.
/// - Transitions not crossing the boundary leave stock untouched.
/// - Setting the current status again is a no-op that reports
///   `stock_updated = false`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the order does not exist,
/// [`DbError::InsufficientStock`] naming the first item that cannot be
/// re-deducted, or [`DbError::Sqlx`] on driver failure.
pub async fn transition_order_status(
    pool: &PgPool,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<StatusTransition, DbError> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, OrderForTransition>(
        "SELECT id, user_id, status FROM orders WHERE id = $1 FOR UPDATE",
    )
    .bind(order_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    if order.status == new_status.as_str() {
        return Ok(StatusTransition {
            order_id: order.id,
            user_id: order.user_id,
            previous_status: order.status,
            new_status,
            stock_updated: false,
        });
    }

    let cancelled = OrderStatus::Cancelled.as_str();
    let entering_cancelled = new_status == OrderStatus::Cancelled;
    let leaving_cancelled = order.status == cancelled && !entering_cancelled;
    let mut stock_updated = false;

    if entering_cancelled || leaving_cancelled {
        let items = sqlx::query_as::<_, ItemForReconciliation>(
            "SELECT product_id, product_name, quantity \
             FROM order_items \
             WHERE order_id = $1 \
             ORDER BY id",
        )
        .bind(order.id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            if entering_cancelled {
                sqlx::query(
                    "UPDATE products \
                     SET stock = stock + $1, updated_at = NOW() \
                     WHERE id = $2",
                )
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await?;
            } else {
                let result = sqlx::query(
                    "UPDATE products \
                     SET stock = stock - $1, updated_at = NOW() \
                     WHERE id = $2 AND stock >= $1",
                )
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    let available: i32 =
                        sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
                            .bind(item.product_id)
                            .fetch_optional(&mut *tx)
                            .await?
                            .unwrap_or(0);

                    // Abort before any status write; the dropped transaction
                    // rolls back the re-deductions already applied.
                    return Err(DbError::InsufficientStock {
                        product_id: item.product_id,
                        product_name: item.product_name.clone(),
                        available,
                        required: item.quantity,
                    });
                }
            }
        }

        stock_updated = true;
    }

    sqlx::query(
        "UPDATE orders \
         SET status = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(new_status.as_str())
    .bind(order.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(StatusTransition {
        order_id: order.id,
        user_id: order.user_id,
        previous_status: order.status,
        new_status,
        stock_updated,
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetches an order with its items.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the order does not exist, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn get_order_with_items(
    pool: &PgPool,
    order_id: i64,
) -> Result<(OrderRow, Vec<OrderItemRow>), DbError> {
    let order = sqlx::query_as::<_, OrderRow>(
        "SELECT id, public_id, user_id, order_number, customer_name, customer_email, \
                customer_phone, customer_address, delivery_method, payment_method, \
                subtotal, delivery_fee, total_amount, notes, status, created_at, updated_at \
         FROM orders \
         WHERE id = $1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let items = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, order_id, product_id, product_name, product_price, quantity, total_price \
         FROM order_items \
         WHERE order_id = $1 \
         ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok((order, items))
}

/// Returns a user's orders, newest first, optionally restricted to orders
/// containing a given product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_for_user(
    pool: &PgPool,
    user_id: i64,
    product_id: Option<i64>,
) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, public_id, user_id, order_number, customer_name, customer_email, \
                customer_phone, customer_address, delivery_method, payment_method, \
                subtotal, delivery_fee, total_amount, notes, status, created_at, updated_at \
         FROM orders o \
         WHERE o.user_id = $1 \
           AND ($2::BIGINT IS NULL OR EXISTS ( \
               SELECT 1 FROM order_items oi \
               WHERE oi.order_id = o.id AND oi.product_id = $2 \
           )) \
         ORDER BY o.created_at DESC, o.id DESC",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the most recent `limit` orders across all users (admin listing).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_orders(pool: &PgPool, limit: i64) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, public_id, user_id, order_number, customer_name, customer_email, \
                customer_phone, customer_address, delivery_method, payment_method, \
                subtotal, delivery_fee, total_amount, notes, status, created_at, updated_at \
         FROM orders \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
