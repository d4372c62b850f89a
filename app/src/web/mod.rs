// shopfront_app/src/web/mod.rs

// Declare child modules
pub mod forms;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod upload;

pub use routes::configure_app_routes;
