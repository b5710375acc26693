use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::OrderError;
use super::model::{NewOrder, NewOrderItem, Order, OrderItem};
use crate::services::images::ImageUrls;

const DEFAULT_COUNTRY: &str = "India";
const DEFAULT_PAYMENT_MODE: &str = "UPI";
const MAX_IDEMPOTENCY_KEY: usize = 128;

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// CREATE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Option<i64>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub qty: Option<i32>,
}

/// Checkout payload. A `user_email` field sent by older clients is ignored;
/// the owner always comes from the bearer token.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub total: Option<Decimal>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    pub fn into_new_order(
        self,
        user_id: i64,
        user_email: &str,
        idempotency_key: Option<String>,
    ) -> Result<NewOrder, OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::MissingOrderData);
        }
        let total = match self.total {
            Some(total) if !total.is_sign_negative() => total.round_dp(2),
            _ => return Err(OrderError::MissingOrderData),
        };

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(n, item)| validate_item(n + 1, item))
            .collect::<Result<Vec<_>, _>>()?;

        let idempotency_key = clean(idempotency_key);
        if idempotency_key.as_ref().is_some_and(|k| k.len() > MAX_IDEMPOTENCY_KEY) {
            return Err(OrderError::InvalidItem(format!(
                "Idempotency-Key must be at most {} characters",
                MAX_IDEMPOTENCY_KEY
            )));
        }

        Ok(NewOrder {
            user_id,
            contact_name: clean(self.contact_name),
            contact_email: clean(self.contact_email).unwrap_or_else(|| user_email.to_string()),
            phone: clean(self.phone),
            country: clean(self.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            address_line1: clean(self.address_line1),
            address_line2: clean(self.address_line2),
            city: clean(self.city),
            state: clean(self.state),
            pincode: clean(self.pincode),
            address: clean(self.address),
            total,
            payment_mode: clean(self.payment_mode).unwrap_or_else(|| DEFAULT_PAYMENT_MODE.to_string()),
            idempotency_key,
            items,
        })
    }
}

fn validate_item(line: usize, item: OrderItemRequest) -> Result<NewOrderItem, OrderError> {
    let name = clean(item.name)
        .ok_or_else(|| OrderError::InvalidItem(format!("Item {} is missing a name", line)))?;

    let price = match item.price {
        Some(price) if !price.is_sign_negative() => price.round_dp(2),
        _ => return Err(OrderError::InvalidItem(format!("Item {} has an invalid price", line))),
    };

    let qty = match item.qty {
        Some(qty) if qty >= 1 => qty,
        _ => return Err(OrderError::InvalidItem(format!("Item {} must have a quantity of at least 1", line))),
    };

    Ok(NewOrderItem {
        product_id: item.product_id,
        name,
        price,
        qty,
    })
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: i64,
}

// =============================================================================
// LISTINGS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
    pub main_image: Option<String>,
    pub reviewed: bool,
}

/// Buckets items by order id, formatting product images on the way.
pub fn group_items(items: Vec<OrderItem>, images: &ImageUrls) -> HashMap<i64, Vec<OrderItemResponse>> {
    let mut grouped: HashMap<i64, Vec<OrderItemResponse>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(OrderItemResponse {
            main_image: images.format(item.main_image.as_deref()),
            reviewed: item.review_count > 0,
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            qty: item.qty,
        });
    }
    grouped
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct MyOrdersResponse {
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct AllOrdersResponse {
    pub orders: Vec<AdminOrderResponse>,
}

// =============================================================================
// STATUS & REVIEWS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub item_id: Option<i64>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
