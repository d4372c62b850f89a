// shopfront_app/src/state.rs
use crate::config::AppConfig;
use shopfront::{CatalogReader, CatalogStore, LocalFileStore, ProductWriter, UploadPolicy};
use std::sync::Arc;

/// Catalog backends the server can run on: PostgreSQL in production, the
/// in-memory catalog in tests.
pub trait Catalog: CatalogStore + CatalogReader + Clone + 'static {}

impl<T> Catalog for T where T: CatalogStore + CatalogReader + Clone + 'static {}

/// Resources constructed once at startup and shared with every handler.
#[derive(Clone)]
pub struct AppState<C> {
  pub catalog: C,
  pub writer: Arc<ProductWriter<C>>,
  pub files: Arc<LocalFileStore>,
  pub upload_policy: UploadPolicy,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl<C: Catalog> AppState<C> {
  pub fn new(catalog: C, files: LocalFileStore, config: Arc<AppConfig>) -> Self {
    let files = Arc::new(files);
    let writer = Arc::new(ProductWriter::new(catalog.clone(), files.clone()));
    Self {
      catalog,
      writer,
      files,
      upload_policy: UploadPolicy::default(),
      config,
    }
  }
}
