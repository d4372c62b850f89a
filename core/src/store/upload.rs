// shopfront/src/store/upload.rs

//! Acceptance rules for uploaded images and naming of stored files.

use crate::error::{CatalogError, CatalogResult};
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Image kinds accepted for upload. Both the file extension and the MIME
/// subtype must be one of these.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Multipart field name carrying product images.
pub const PRODUCT_IMAGES_FIELD: &str = "product_images";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
  pub max_file_bytes: usize,
  pub max_files: usize,
}

impl Default for UploadPolicy {
  fn default() -> Self {
    Self {
      max_file_bytes: 5 * 1024 * 1024,
      max_files: 5,
    }
  }
}

impl UploadPolicy {
  /// Validates the declared type of an upload and returns its normalized
  /// (lowercase) extension.
  pub fn check_image(&self, original_name: &str, content_type: Option<&str>) -> CatalogResult<String> {
    let extension = Path::new(original_name)
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| e.to_ascii_lowercase())
      .unwrap_or_default();
    let subtype = content_type
      .and_then(|ct| ct.split(';').next())
      .and_then(|essence| essence.trim().strip_prefix("image/"))
      .map(|s| s.to_ascii_lowercase())
      .unwrap_or_default();

    if !ALLOWED_IMAGE_TYPES.contains(&extension.as_str()) || !ALLOWED_IMAGE_TYPES.contains(&subtype.as_str()) {
      return Err(CatalogError::UploadRejected(format!(
        "'{}' must be a valid image (JPEG, PNG, GIF, WEBP)",
        original_name
      )));
    }
    Ok(extension)
  }

  /// Called before accepting the `count`-th file (1-based) of a request.
  pub fn check_count(&self, count: usize) -> CatalogResult<()> {
    if count > self.max_files {
      return Err(CatalogError::UploadRejected(format!(
        "At most {} files may be uploaded per request",
        self.max_files
      )));
    }
    Ok(())
  }

  pub fn check_size(&self, original_name: &str, size: usize) -> CatalogResult<()> {
    if size > self.max_file_bytes {
      return Err(CatalogError::UploadRejected(format!(
        "'{}' exceeds the {} byte limit",
        original_name, self.max_file_bytes
      )));
    }
    Ok(())
  }
}

/// Unique stored filename: `{field}-{unix_millis}-{random}.{extension}`.
pub fn stored_file_name(field: &str, extension: &str) -> String {
  let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
  format!("{}-{}-{}.{}", field, Utc::now().timestamp_millis(), suffix, extension)
}

/// Content type served for a stored basename, derived from its extension.
pub fn content_type_for(basename: &str) -> &'static str {
  let extension = Path::new(basename)
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase());
  match extension.as_deref() {
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("png") => "image/png",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_matching_extension_and_mime() {
    let policy = UploadPolicy::default();
    assert_eq!(policy.check_image("Latte.JPG", Some("image/jpeg")).unwrap(), "jpg");
    assert_eq!(policy.check_image("beans.webp", Some("image/webp")).unwrap(), "webp");
    assert_eq!(policy.check_image("a.png", Some("image/png; charset=binary")).unwrap(), "png");
  }

  #[test]
  fn rejects_non_images() {
    let policy = UploadPolicy::default();
    assert!(policy.check_image("notes.txt", Some("text/plain")).is_err());
    assert!(policy.check_image("fake.jpg", Some("application/pdf")).is_err());
    assert!(policy.check_image("noext", Some("image/png")).is_err());
    assert!(policy.check_image("a.png", None).is_err());
  }

  #[test]
  fn enforces_count_and_size_limits() {
    let policy = UploadPolicy::default();
    assert!(policy.check_count(5).is_ok());
    assert!(matches!(policy.check_count(6), Err(CatalogError::UploadRejected(_))));
    assert!(policy.check_size("a.jpg", 5 * 1024 * 1024).is_ok());
    assert!(policy.check_size("a.jpg", 5 * 1024 * 1024 + 1).is_err());
  }

  #[test]
  fn stored_names_are_unique_and_keep_extension() {
    let a = stored_file_name(PRODUCT_IMAGES_FIELD, "png");
    let b = stored_file_name(PRODUCT_IMAGES_FIELD, "png");
    assert_ne!(a, b);
    assert!(a.starts_with("product_images-"));
    assert!(a.ends_with(".png"));
    assert!(!a.contains(','));
  }

  #[test]
  fn content_type_follows_extension() {
    assert_eq!(content_type_for("x.JPEG"), "image/jpeg");
    assert_eq!(content_type_for("x.gif"), "image/gif");
    assert_eq!(content_type_for("x.bin"), "application/octet-stream");
  }
}
