// shopfront_app/src/errors.rs

use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde_json::json;
use shopfront::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Payload Too Large: {0}")]
  PayloadTooLarge(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Catalog Error: {source}")]
  Catalog {
    #[from] // Allows conversion from shopfront::CatalogError
    source: CatalogError,
  },
}

impl From<actix_multipart::MultipartError> for AppError {
  fn from(err: actix_multipart::MultipartError) -> Self {
    AppError::Validation(format!("Malformed multipart body: {}", err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
      AppError::Catalog { source } => match source.root_cause() {
        CatalogError::UploadRejected(_) | CatalogError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        CatalogError::StillReferenced(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let message = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::PayloadTooLarge(m) => {
        m.clone()
      }
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Catalog { source } => match source.root_cause() {
        CatalogError::UploadRejected(m) => m.clone(),
        CatalogError::InvalidReference(m) => format!("Invalid file reference: {}", m),
        CatalogError::StillReferenced(_) => "Product has order history and cannot be deleted".to_string(),
        _ => {
          if let CatalogError::TransactionFailed { cleanup, .. } = source {
            if !cleanup.is_clean() {
              tracing::warn!(orphaned = ?cleanup.failed, "Files left behind by a failed write");
            }
          }
          "Catalog operation failed".to_string()
        }
      },
    };
    HttpResponse::build(self.status_code()).json(json!({"success": false, "error": message}))
  }
}

/// Malformed path segments (such as a product id that is not a UUID) answer
/// with the same JSON body as every other error.
pub fn path_config() -> web::PathConfig {
  web::PathConfig::default()
    .error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default()
    .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into())
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
