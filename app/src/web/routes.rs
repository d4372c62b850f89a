// shopfront_app/src/web/routes.rs

use crate::errors::{path_config, query_config};
use crate::state::Catalog;
use crate::web::handlers::{catalog_handlers, product_handlers, upload_handlers};
use actix_web::web;
use shopfront::store::UPLOADS_ROUTE;

// Liveness only; database health is visible through request failures.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "success": true, "status": "ok" }))
}

pub async fn not_found_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::NotFound().json(serde_json::json!({ "success": false, "error": "Route not found" }))
}

// Called in `main.rs` (and in tests) to configure services for the Actix App.
pub fn configure_app_routes<C: Catalog>(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(path_config())
    .app_data(query_config())
    .route(
      &format!("/{}/{{filename}}", UPLOADS_ROUTE),
      web::get().to(upload_handlers::serve_upload_handler::<C>),
    )
    .service(
      web::scope("/api")
        // Health Check Route
        .route("/health", web::get().to(health_check_handler))
        // Supplier product management; the supplier comes from the X-Supplier-Id header
        .service(
          web::scope("/products")
            .route("", web::post().to(product_handlers::create_product_handler::<C>))
            .route("/mine", web::get().to(product_handlers::list_my_products_handler::<C>))
            .route("/{product_id}", web::put().to(product_handlers::update_product_handler::<C>))
            .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler::<C>)),
        )
        // Public catalog
        .service(
          web::scope("/catalog")
            .route("", web::get().to(catalog_handlers::list_public_products_handler::<C>))
            .route("/best-sellers", web::get().to(catalog_handlers::best_sellers_handler::<C>))
            .route("/{product_id}", web::get().to(catalog_handlers::get_product_handler::<C>)),
        ),
    );
}
