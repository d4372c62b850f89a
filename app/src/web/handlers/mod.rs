// shopfront_app/src/web/handlers/mod.rs

// Declare handler modules
pub mod catalog_handlers;
pub mod product_handlers;
pub mod upload_handlers;
