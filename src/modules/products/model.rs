use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

// =============================================================================
// PRODUCT
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub short_desc: Option<String>,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub sub_image_1: Option<String>,
    pub sub_image_2: Option<String>,
    pub sub_image_3: Option<String>,
    pub stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn images(&self) -> [Option<String>; 4] {
        [
            self.main_image.clone(),
            self.sub_image_1.clone(),
            self.sub_image_2.clone(),
            self.sub_image_3.clone(),
        ]
    }
}

/// Column values for an insert or a full update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub short_desc: Option<String>,
    pub description: Option<String>,
    /// main_image, sub_image_1, sub_image_2, sub_image_3
    pub images: [Option<String>; 4],
    pub stock: bool,
}

// =============================================================================
// REVIEWS
// =============================================================================

/// Testimonial entered by an admin together with the product.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductTestimonial {
    pub id: i64,
    pub product_id: i64,
    pub reviewer_name: String,
    pub review_text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

/// Aggregate of customer reviews left on delivered orders.
#[derive(Debug, Clone, FromRow)]
pub struct RatingSummary {
    pub product_id: i64,
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
}
