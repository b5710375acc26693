use axum::extract::{Multipart, Path, State};
use std::collections::HashMap;
use std::sync::Arc;

use crate::AppState;
use crate::error::Json;
use crate::modules::auth::RequireAdmin;
use super::crud::ProductCrud;
use super::error::CatalogError;
use super::form::{ProductForm, IMAGE_FIELDS};
use super::import;
use super::model::NewProduct;
use super::schema::{
    BulkImportResponse, CatalogStats, DeleteProductResponse, ProductDetailResponse,
    ProductListResponse, ProductResponse, ProductSavedResponse,
};

// =============================================================================
// GET /api/products
// =============================================================================

pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProductListResponse>, CatalogError> {
    let crud = ProductCrud::new(state.db.clone());

    let products = crud.list().await?;
    let ratings: HashMap<i64, _> = crud
        .rating_summaries()
        .await?
        .into_iter()
        .map(|r| (r.product_id, r))
        .collect();

    let products: Vec<ProductResponse> = products
        .into_iter()
        .map(|p| {
            let rating = ratings.get(&p.id);
            ProductResponse::from_product(p, rating, &state.images)
        })
        .collect();
    let stats = CatalogStats::from_products(&products);

    Ok(Json(ProductListResponse { products, stats }))
}

// =============================================================================
// GET /api/products/{id}
// =============================================================================

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProductDetailResponse>, CatalogError> {
    let crud = ProductCrud::new(state.db.clone());

    let product = crud.find_by_id(id).await?.ok_or(CatalogError::NotFound)?;
    let rating = crud.rating_summary(id).await?;
    let testimonials = crud.testimonials(id).await?;

    Ok(Json(ProductDetailResponse {
        product: ProductResponse::from_product(product, rating.as_ref(), &state.images),
        testimonials,
    }))
}

// =============================================================================
// POST /api/products
// =============================================================================

pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ProductSavedResponse>, CatalogError> {
    let form = ProductForm::from_multipart(multipart).await?;
    let mut product = form.to_new_product(true)?;
    let stored = resolve_images(&state, &form, &mut product, [None, None, None, None]).await?;

    let crud = ProductCrud::new(state.db.clone());
    let product_id = match crud.create(&product).await {
        Ok(id) => id,
        Err(e) => {
            state.images.discard(&stored).await;
            return Err(e.into());
        }
    };

    if let Some((reviewer, text, rating)) = form.seed_review() {
        crud.add_testimonial(product_id, &reviewer, &text, rating).await?;
    }

    tracing::info!(product_id, admin = %admin.email, "Product created");
    Ok(Json(ProductSavedResponse {
        success: true,
        product_id,
    }))
}

// =============================================================================
// PUT /api/products/{id}
// =============================================================================

pub async fn update_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ProductSavedResponse>, CatalogError> {
    let crud = ProductCrud::new(state.db.clone());
    let existing = crud.find_by_id(id).await?.ok_or(CatalogError::NotFound)?;

    let form = ProductForm::from_multipart(multipart).await?;
    let mut product = form.to_new_product(existing.stock)?;
    let stored = resolve_images(&state, &form, &mut product, existing.images()).await?;

    // An unchanged row reports zero affected rows, so existence was checked above.
    if let Err(e) = crud.update(id, &product).await {
        state.images.discard(&stored).await;
        return Err(e.into());
    }

    tracing::info!(product_id = id, admin = %admin.email, "Product updated");
    Ok(Json(ProductSavedResponse {
        success: true,
        product_id: id,
    }))
}

/// Fills the image slots: uploaded files first, then URL strings in the
/// form, then whatever is currently stored. Returns the references of the
/// files written to disk so a failed save can remove them.
async fn resolve_images(
    state: &AppState,
    form: &ProductForm,
    product: &mut NewProduct,
    current: [Option<String>; 4],
) -> Result<Vec<String>, CatalogError> {
    let mut stored = Vec::new();

    for (slot, (field, current)) in IMAGE_FIELDS.iter().zip(current).enumerate() {
        product.images[slot] = match form.files.get(*field) {
            Some(file) => {
                let reference = match state
                    .images
                    .store_upload(field, file.file_name.as_deref(), &file.bytes)
                    .await
                {
                    Ok(reference) => reference,
                    Err(e) => {
                        state.images.discard(&stored).await;
                        return Err(e.into());
                    }
                };
                stored.push(reference.clone());
                Some(reference)
            }
            None => form.image_text(field, current),
        };
    }
    Ok(stored)
}

// =============================================================================
// DELETE /api/products/{id}
// =============================================================================

pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteProductResponse>, CatalogError> {
    let crud = ProductCrud::new(state.db.clone());

    if !crud.delete(id).await? {
        return Err(CatalogError::NotFound);
    }

    tracing::info!(product_id = id, admin = %admin.email, "Product deleted");
    Ok(Json(DeleteProductResponse {
        success: true,
        message: "Product deleted".to_string(),
    }))
}

// =============================================================================
// POST /api/products/bulk-import
// =============================================================================

pub async fn bulk_import(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BulkImportResponse>, CatalogError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                upload = Some(bytes.to_vec());
            }
        }
    }
    let bytes = upload.ok_or(CatalogError::NoFile)?;

    let sheet = import::read_first_sheet(bytes)?;
    let outcome = import::parse_rows(&sheet)?;

    let crud = ProductCrud::new(state.db.clone());
    let inserted = crud.create_many(&outcome.products).await? as usize;

    tracing::info!(
        inserted,
        skipped = outcome.skipped,
        admin = %admin.email,
        "Bulk import finished"
    );
    Ok(Json(BulkImportResponse {
        success: true,
        inserted,
        skipped: outcome.skipped,
    }))
}
