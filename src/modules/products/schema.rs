use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use super::model::{Product, ProductTestimonial, RatingSummary};
use crate::services::images::ImageUrls;

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ProductResponse {
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
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn from_product(product: Product, rating: Option<&RatingSummary>, images: &ImageUrls) -> Self {
        Self {
            main_image: images.format(product.main_image.as_deref()),
            sub_image_1: images.format(product.sub_image_1.as_deref()),
            sub_image_2: images.format(product.sub_image_2.as_deref()),
            sub_image_3: images.format(product.sub_image_3.as_deref()),
            id: product.id,
            name: product.name,
            category: product.category,
            subcategory: product.subcategory,
            price: product.price,
            discounted_price: product.discounted_price,
            short_desc: product.short_desc,
            description: product.description,
            stock: product.stock,
            average_rating: rating.and_then(|r| r.average_rating).map(|avg| avg.round_dp(1)),
            review_count: rating.map(|r| r.review_count).unwrap_or(0),
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub categories: usize,
    /// Products currently in stock.
    pub active: usize,
}

impl CatalogStats {
    pub fn from_products(products: &[ProductResponse]) -> Self {
        let categories: HashSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
        Self {
            total: products.len(),
            categories: categories.len(),
            active: products.iter().filter(|p| p.stock).count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub stats: CatalogStats,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub testimonials: Vec<ProductTestimonial>,
}

#[derive(Debug, Serialize)]
pub struct ProductSavedResponse {
    pub success: bool,
    pub product_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BulkImportResponse {
    pub success: bool,
    pub inserted: usize,
    pub skipped: usize,
}
