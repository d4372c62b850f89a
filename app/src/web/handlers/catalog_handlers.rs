// shopfront_app/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use shopfront::CatalogReader;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::state::{AppState, Catalog};

const DEFAULT_BEST_SELLERS: u32 = 5;
const MAX_BEST_SELLERS: u32 = 50;

#[instrument(name = "handler::list_public_products", skip(app_state))]
pub async fn list_public_products_handler<C: Catalog>(app_state: web::Data<AppState<C>>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.find_all_public_products().await?;

  info!("Successfully fetched {} public products.", products.len());
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": products
  })))
}

#[derive(Deserialize, Debug)]
pub struct BestSellersQuery {
  pub limit: Option<u32>,
}

#[instrument(name = "handler::best_sellers", skip(app_state))]
pub async fn best_sellers_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  query: web::Query<BestSellersQuery>,
) -> Result<HttpResponse, AppError> {
  let limit = query.limit.unwrap_or(DEFAULT_BEST_SELLERS).clamp(1, MAX_BEST_SELLERS);
  let best_sellers = app_state.catalog.find_best_sellers(limit).await?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": best_sellers
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  match app_state.catalog.find_product_by_id(product_id).await? {
    Some(detail) => Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": detail
    }))),
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}
