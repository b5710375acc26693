//! Multipart product forms and the value coercions shared with bulk import.

use axum::{body::Bytes, extract::Multipart};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use super::error::CatalogError;
use super::model::NewProduct;

pub const IMAGE_FIELDS: [&str; 4] = ["main_image", "sub_image_1", "sub_image_2", "sub_image_3"];

/// Accepts the truthy spellings the admin form and spreadsheets use.
pub fn parse_stock_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on"
    )
}

pub fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, CatalogError> {
    let cleaned = value.trim().replace(',', "");
    match Decimal::from_str(&cleaned) {
        Ok(amount) if !amount.is_sign_negative() => Ok(amount.round_dp(2)),
        _ => Err(CatalogError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Text fields and file parts of a product form, before validation.
#[derive(Default)]
pub struct ProductForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl ProductForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, CatalogError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part for an untouched file input.
                    if !bytes.is_empty() {
                        form.files.insert(
                            name,
                            UploadedFile {
                                file_name: Some(file_name),
                                bytes,
                            },
                        );
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<String> {
        non_empty(self.fields.get(name))
    }

    /// Validates the scalar columns. Images are resolved separately because
    /// uploads must only be written once the form is known to be valid.
    /// `existing_stock` is used when the form omits the stock flag.
    pub fn to_new_product(&self, existing_stock: bool) -> Result<NewProduct, CatalogError> {
        let (Some(name), Some(category), Some(price)) =
            (self.field("name"), self.field("category"), self.field("price"))
        else {
            return Err(CatalogError::MissingRequiredFields);
        };

        let price = parse_amount("price", &price)?;
        let discounted_price = self
            .field("discounted_price")
            .map(|v| parse_amount("discounted_price", &v))
            .transpose()?;

        let stock = self
            .fields
            .get("stock")
            .map(|v| parse_stock_flag(v))
            .unwrap_or(existing_stock);

        Ok(NewProduct {
            name,
            category,
            subcategory: self.field("subcategory"),
            price,
            discounted_price,
            short_desc: self.field("short_desc"),
            description: self.field("description"),
            images: [None, None, None, None],
            stock,
        })
    }

    /// Image reference for one slot: a URL string in the form wins over the
    /// stored value, an empty string clears it, an absent field keeps it.
    /// Uploaded files are applied by the caller after this.
    pub fn image_text(&self, slot: &str, current: Option<String>) -> Option<String> {
        match self.fields.get(slot) {
            Some(value) => non_empty(Some(value)),
            None => current,
        }
    }

    pub fn seed_review(&self) -> Option<(String, String, i32)> {
        let text = self.field("review_text")?;
        let reviewer = self.field("reviewer_name")?;
        let rating = self
            .field("rating")
            .and_then(|r| r.parse::<i32>().ok())
            .map(|r| r.clamp(1, 5))
            .unwrap_or(5);
        Some((reviewer, text, rating))
    }
}
