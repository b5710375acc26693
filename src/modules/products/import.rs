//! Spreadsheet bulk import. The first sheet's header row names the columns;
//! every following row becomes a product unless it lacks a required value.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::collections::HashMap;
use std::io::Cursor;

use super::error::CatalogError;
use super::form::{parse_amount, parse_stock_flag};
use super::model::NewProduct;

/// Accepted header spellings per product column, compared case-insensitively.
const COLUMN_ALIASES: [(&str, &[&str]); 12] = [
    ("name", &["product name", "name"]),
    ("category", &["category"]),
    ("subcategory", &["subcategory", "sub category"]),
    ("price", &["original price", "price"]),
    ("discounted_price", &["discounted price", "discounted_price"]),
    ("short_desc", &["short description", "short_desc"]),
    ("description", &["full description", "description"]),
    ("main_image", &["main image url", "main_image"]),
    ("sub_image_1", &["sub image 1 url", "sub_image_1"]),
    ("sub_image_2", &["sub image 2 url", "sub_image_2"]),
    ("sub_image_3", &["sub image 3 url", "sub_image_3"]),
    ("stock", &["in stock", "stock"]),
];

#[derive(Debug, Default, PartialEq)]
pub struct ImportOutcome {
    pub products: Vec<NewProduct>,
    pub skipped: usize,
}

pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Range<Data>, CatalogError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CatalogError::UnreadableSheet(e.to_string()))?;

    workbook
        .worksheet_range_at(0)
        .ok_or(CatalogError::EmptySheet)?
        .map_err(|e| CatalogError::UnreadableSheet(e.to_string()))
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn column_index(headers: &[String]) -> HashMap<&'static str, usize> {
    let mut index = HashMap::new();
    for (column, aliases) in COLUMN_ALIASES {
        if let Some(pos) = headers.iter().position(|h| aliases.contains(&h.as_str())) {
            index.insert(column, pos);
        }
    }
    index
}

/// Maps sheet rows to products. Returns `EmptySheet` when there is no data
/// row at all; rows that cannot become a product are counted as skipped.
pub fn parse_rows(range: &Range<Data>) -> Result<ImportOutcome, CatalogError> {
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or(CatalogError::EmptySheet)?
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default().to_lowercase())
        .collect();
    let columns = column_index(&headers);

    let data_rows: Vec<&[Data]> = rows
        .filter(|row| row.iter().any(|cell| cell_text(cell).is_some()))
        .collect();
    if data_rows.is_empty() {
        return Err(CatalogError::EmptySheet);
    }

    let mut outcome = ImportOutcome::default();
    for (n, row) in data_rows.into_iter().enumerate() {
        let value = |column: &str| {
            columns
                .get(column)
                .and_then(|&i| row.get(i))
                .and_then(cell_text)
        };

        match row_to_product(value) {
            Ok(product) => outcome.products.push(product),
            Err(e) => {
                tracing::debug!(row = n + 2, error = %e, "Skipping spreadsheet row");
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

fn row_to_product(value: impl Fn(&str) -> Option<String>) -> Result<NewProduct, CatalogError> {
    let (Some(name), Some(category), Some(price)) = (value("name"), value("category"), value("price"))
    else {
        return Err(CatalogError::MissingRequiredFields);
    };

    Ok(NewProduct {
        name,
        category,
        subcategory: value("subcategory"),
        price: parse_amount("price", &price)?,
        discounted_price: value("discounted_price")
            .map(|v| parse_amount("discounted_price", &v))
            .transpose()?,
        short_desc: value("short_desc"),
        description: value("description"),
        images: [
            value("main_image"),
            value("sub_image_1"),
            value("sub_image_2"),
            value("sub_image_3"),
        ],
        stock: value("stock").map(|v| parse_stock_flag(&v)).unwrap_or(false),
    })
}
