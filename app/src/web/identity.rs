// shopfront_app/src/web/identity.rs

use crate::errors::AppError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Header carrying the authenticated supplier, set by the gateway that
/// performs authentication in front of this service.
pub const SUPPLIER_HEADER: &str = "X-Supplier-Id";

/// The supplier on whose behalf a write or a "mine" listing runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplierId(pub Uuid);

impl FromRequest for SupplierId {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let parsed = req
      .headers()
      .get(SUPPLIER_HEADER)
      .ok_or_else(|| AppError::Auth(format!("Missing {} header", SUPPLIER_HEADER)))
      .and_then(|value| {
        value
          .to_str()
          .ok()
          .and_then(|s| Uuid::parse_str(s.trim()).ok())
          .map(SupplierId)
          .ok_or_else(|| AppError::Auth(format!("Malformed {} header", SUPPLIER_HEADER)))
      });
    ready(parsed)
  }
}
