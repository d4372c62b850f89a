// shopfront_app/src/web/handlers/product_handlers.rs

//! Supplier-facing product writes and the supplier's own listing.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use shopfront::{CatalogReader, NewProduct};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::state::{AppState, Catalog};
use crate::web::forms::parse_product_fields;
use crate::web::identity::SupplierId;
use crate::web::upload::{discard_files, read_product_submission, ProductSubmission};

/// Parses the submission's fields, removing its files if they are invalid.
async fn fields_or_discard<C: Catalog>(
  app_state: &AppState<C>,
  submission: &ProductSubmission,
) -> Result<shopfront::ProductFields> {
  match parse_product_fields(&submission.text_fields) {
    Ok(fields) => Ok(fields),
    Err(e) => {
      discard_files(app_state.files.as_ref(), &submission.files).await;
      Err(e)
    }
  }
}

#[instrument(name = "handler::create_product", skip(app_state, payload), fields(supplier_id = %supplier.0))]
pub async fn create_product_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  supplier: SupplierId,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let submission = read_product_submission(payload, app_state.files.as_ref(), &app_state.upload_policy).await?;
  let fields = fields_or_discard(&app_state, &submission).await?;

  let new_product = NewProduct {
    supplier_id: supplier.0,
    fields,
  };
  let product = app_state.writer.create_product(new_product, &submission.files).await?;

  info!(product_id = %product.id, images = product.images.len(), "Product created.");
  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "message": "Product created successfully.",
      "data": product
  })))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, path, payload),
  fields(supplier_id = %supplier.0, product_id = %path.as_ref())
)]
pub async fn update_product_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  supplier: SupplierId,
  path: web::Path<Uuid>,
  payload: Multipart,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let submission = read_product_submission(payload, app_state.files.as_ref(), &app_state.upload_policy).await?;
  let fields = fields_or_discard(&app_state, &submission).await?;

  let outcome = app_state
    .writer
    .update_product_by_id(product_id, supplier.0, fields, &submission.files)
    .await?;

  if outcome.matched == 0 {
    warn!("Product {} not found for this supplier.", product_id);
    return Err(AppError::NotFound(format!(
      "Product {} not found or not owned by this supplier.",
      product_id
    )));
  }
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Product updated successfully.",
      "data": outcome
  })))
}

#[instrument(
  name = "handler::delete_product",
  skip(app_state, path),
  fields(supplier_id = %supplier.0, product_id = %path.as_ref())
)]
pub async fn delete_product_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  supplier: SupplierId,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let outcome = app_state.writer.delete_product_by_id(product_id, supplier.0).await?;

  if outcome.affected == 0 {
    return Err(AppError::NotFound(format!(
      "Product {} not found or not owned by this supplier.",
      product_id
    )));
  }
  if !outcome.cleanup.is_clean() {
    warn!(orphaned = ?outcome.cleanup.failed, "Product deleted but some image files remain.");
  }
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Product deleted successfully."
  })))
}

#[derive(Deserialize, Debug)]
pub struct MyProductsQuery {
  pub search: Option<String>,
}

#[instrument(name = "handler::list_my_products", skip(app_state), fields(supplier_id = %supplier.0))]
pub async fn list_my_products_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  supplier: SupplierId,
  query: web::Query<MyProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state
    .catalog
    .find_products_by_supplier(supplier.0, query.search.as_deref())
    .await?;

  info!("Fetched {} products for supplier.", products.len());
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": products
  })))
}
