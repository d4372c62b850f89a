// shopfront/src/store/mod.rs

//! File Store adapter: durable storage for uploaded product images.
//!
//! Files live outside the relational transaction. The writer therefore relies
//! on two orderings: a file is saved before any row references it, and it is
//! deleted only once the transaction that stopped referencing it has finished.

pub mod local;
pub mod upload;

pub use local::LocalFileStore;
pub use upload::UploadPolicy;

use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// URL path segment under which stored files are served.
pub const UPLOADS_ROUTE: &str = "uploads";

/// A file already persisted to the store, as handed over by the upload layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
  pub path: PathBuf,
  pub original_name: String,
}

#[async_trait]
pub trait FileStore: Send + Sync {
  /// Persists `bytes` under `stored_name`.
  async fn save(&self, stored_name: &str, original_name: &str, bytes: &[u8]) -> CatalogResult<StoredFile>;

  /// Public reference of a stored file.
  fn reference_for(&self, file: &StoredFile) -> CatalogResult<String>;

  /// Removes the object behind `reference`. A missing object is not an error.
  async fn delete(&self, reference: &str) -> CatalogResult<()>;
}

/// `{base_url}/uploads/{basename}`
pub fn public_reference(base_url: &str, basename: &str) -> String {
  format!("{}/{}/{}", base_url.trim_end_matches('/'), UPLOADS_ROUTE, basename)
}

/// Last path segment of a reference or path, rejecting anything that could
/// escape the store root.
pub fn basename_of(reference: &str) -> CatalogResult<&str> {
  let name = reference.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
  if name.is_empty() || name == "." || name == ".." {
    return Err(CatalogError::InvalidReference(reference.to_string()));
  }
  Ok(name)
}

/// Basename of a stored file's path.
pub fn file_basename(path: &Path) -> CatalogResult<&str> {
  path
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| CatalogError::InvalidReference(path.display().to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn public_reference_joins_base_url_and_basename() {
    assert_eq!(
      public_reference("http://localhost:5000/", "product_images-1-2.jpg"),
      "http://localhost:5000/uploads/product_images-1-2.jpg"
    );
    assert_eq!(public_reference("https://cdn.test", "a.png"), "https://cdn.test/uploads/a.png");
  }

  #[test]
  fn basename_of_takes_last_segment() {
    assert_eq!(basename_of("http://h/uploads/a.jpg").unwrap(), "a.jpg");
    assert_eq!(basename_of("a.jpg").unwrap(), "a.jpg");
    assert_eq!(basename_of("uploads\\b.png").unwrap(), "b.png");
  }

  #[test]
  fn basename_of_rejects_traversal_and_empty() {
    assert!(matches!(basename_of("http://h/uploads/"), Err(CatalogError::InvalidReference(_))));
    assert!(matches!(basename_of("http://h/.."), Err(CatalogError::InvalidReference(_))));
    assert!(matches!(basename_of(""), Err(CatalogError::InvalidReference(_))));
  }
}
