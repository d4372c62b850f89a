// shopfront_app/src/web/middleware.rs

use crate::config::AppConfig;
use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::middleware::DefaultHeaders;

/// Requests without an `Origin` header (server-to-server, curl) pass through;
/// browser requests must come from one of the configured origins.
pub fn cors(config: &AppConfig) -> Cors {
  let cors = Cors::default()
    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
    .allowed_headers(vec![
      header::CONTENT_TYPE,
      header::AUTHORIZATION,
      HeaderName::from_static("x-supplier-id"),
    ])
    .supports_credentials()
    .max_age(3600);

  tracing::debug!(origins = ?config.allowed_origins, "CORS allowlist configured.");
  config
    .allowed_origins
    .iter()
    .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

/// Hardening headers added to every response. Images are served to the
/// frontends from another origin, hence the cross-origin resource policy.
pub fn security_headers() -> DefaultHeaders {
  DefaultHeaders::new()
    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
    .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
    .add((header::REFERRER_POLICY, "no-referrer"))
    .add((HeaderName::from_static("cross-origin-resource-policy"), "cross-origin"))
}
