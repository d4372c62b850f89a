// shopfront_app/src/web/handlers/upload_handlers.rs

use actix_web::{http::header, web, HttpResponse};
use shopfront::store::upload::content_type_for;
use tracing::instrument;

use crate::errors::{AppError, Result};
use crate::state::{AppState, Catalog};

/// Serves a stored image by basename.
#[instrument(name = "handler::serve_upload", skip(app_state))]
pub async fn serve_upload_handler<C: Catalog>(
  app_state: web::Data<AppState<C>>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let filename = path.into_inner();
  match app_state.files.read(&filename).await? {
    Some(bytes) => Ok(
      HttpResponse::Ok()
        .content_type(content_type_for(&filename))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes),
    ),
    None => Err(AppError::NotFound(format!("File {} not found.", filename))),
  }
}
