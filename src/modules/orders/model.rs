use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Forward progress one step at a time, or cancellation before the
    /// order is finished.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Placed, Processing) | (Processing, Shipped) | (Shipped, Delivered) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{}'", s))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// ORDER
// =============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub contact_name: Option<String>,
    pub contact_email: String,
    pub phone: Option<String>,
    pub country: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub total: Decimal,
    pub payment_mode: String,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    #[serde(skip)]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Single-line shipping address for documents. The free-form `address`
    /// wins when the checkout supplied one.
    pub fn full_address(&self) -> Option<String> {
        if let Some(address) = self.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            return Some(address.to_string());
        }

        let city_pin = format!(
            "{} - {}",
            self.city.as_deref().unwrap_or_default(),
            self.pincode.as_deref().unwrap_or_default()
        );
        let parts: Vec<&str> = [
            self.address_line1.as_deref(),
            self.address_line2.as_deref(),
            Some(city_pin.trim()),
            self.state.as_deref(),
            Some(self.country.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != "-")
        .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Order joined with its owner, for the admin listing and invoices.
#[derive(Debug, Clone, FromRow)]
pub struct OrderWithUser {
    #[sqlx(flatten)]
    pub order: Order,
    pub user_name: String,
    pub user_email: String,
}

/// Snapshot of a cart line at purchase time.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
    /// Current image of the product, if it still exists.
    pub main_image: Option<String>,
    pub review_count: i64,
}

/// Validated order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub contact_name: Option<String>,
    pub contact_email: String,
    pub phone: Option<String>,
    pub country: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub total: Decimal,
    pub payment_mode: String,
    pub idempotency_key: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
}
