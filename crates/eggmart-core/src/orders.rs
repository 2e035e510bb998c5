//! Domain enums shared between the database and HTTP layers: order status,
//! delivery method, sale status, and user role.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// No formal transition table is enforced between non-cancelled statuses;
/// the only transitions with side effects are those crossing the `cancelled`
/// boundary (stock restore / re-deduct).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Canned customer-facing notification copy for a status change.
    #[must_use]
    pub fn notification_copy(self) -> (&'static str, &'static str) {
        match self {
            OrderStatus::Pending => (
                "Order received",
                "We have received your order and will confirm it shortly.",
            ),
            OrderStatus::Confirmed => (
                "Order confirmed",
                "Your order has been confirmed and is being prepared.",
            ),
            OrderStatus::Processing => (
                "Order processing",
                "Your order is being packed and will ship soon.",
            ),
            OrderStatus::Shipped => ("Order shipped", "Your order is on its way."),
            OrderStatus::Delivered => (
                "Order delivered",
                "Your order has been delivered. You can now rate it.",
            ),
            OrderStatus::Cancelled => ("Order cancelled", "Your order has been cancelled."),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an order reaches the customer; drives the delivery fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

impl DeliveryMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Delivery => "delivery",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(DeliveryMethod::Pickup),
            "delivery" => Some(DeliveryMethod::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a sale row. A sale is effectively active only when its status is
/// `Active` AND the current time falls inside `[start_date, end_date]`;
/// expired sales are flipped lazily on catalog reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Active,
    Inactive,
    Expired,
}

impl SaleStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Inactive => "inactive",
            SaleStatus::Expired => "expired",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SaleStatus::Active),
            "inactive" => Some(SaleStatus::Inactive),
            "expired" => Some(SaleStatus::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role stored on the `users` row; admin routes require `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}
