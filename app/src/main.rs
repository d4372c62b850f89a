// shopfront_app/src/main.rs

// Declare modules for the application
mod config;
mod errors;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::web::middleware::{cors, security_headers};
use crate::web::routes::not_found_handler;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use shopfront::{LocalFileStore, PgCatalog};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // RUST_LOG overrides the default level
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting shopfront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(anyhow::anyhow!("Configuration error: {}", e));
    }
  };

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.database_max_connections)
    .connect(&app_config.database_url)
    .await
    .context("Failed to connect to the database")?;
  tracing::info!("Successfully connected to the database.");

  let catalog = PgCatalog::new(db_pool.clone());
  if app_config.run_migrations {
    catalog.migrate().await.context("Failed to apply database migrations")?;
  }

  let files = LocalFileStore::new(app_config.uploads_dir.clone(), app_config.backend_url.clone());
  files.ensure_root().await.context("Failed to prepare the upload directory")?;

  let app_state = AppState::new(catalog, files, app_config.clone());

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let cors_config = app_config.clone();
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(cors(&cors_config))
      .wrap(security_headers())
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes::<PgCatalog>)
      .default_service(actix_data::to(not_found_handler))
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("Server terminated with an error")?;

  db_pool.close().await;
  tracing::info!("Server stopped.");
  Ok(())
}
