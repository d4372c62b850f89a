// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use parking_lot::Mutex;
use shopfront::store::{basename_of, file_basename, public_reference};
use shopfront::{CatalogError, CatalogResult, FileStore, NewProduct, ProductFields, StoredFile};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::Level;
use uuid::Uuid;

pub const BASE_URL: &str = "http://localhost:5000";

// --- File store double that records every call ---
#[derive(Debug, Default)]
pub struct RecordingFileStore {
  stored: Mutex<HashSet<String>>,
  delete_attempts: Mutex<Vec<String>>,
  failing: Mutex<HashSet<String>>,
}

impl RecordingFileStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Saves `count` files the way the upload layer would, returning them.
  pub async fn upload(&self, count: usize) -> Vec<StoredFile> {
    let mut files = Vec::with_capacity(count);
    for i in 0..count {
      let name = format!("product_images-{}-{}.jpg", i, Uuid::new_v4().simple());
      files.push(self.save(&name, &format!("photo{}.jpg", i), b"jpeg").await.unwrap());
    }
    files
  }

  /// Makes deletes of this basename fail with an I/O error.
  pub fn fail_delete_of(&self, basename: &str) {
    self.failing.lock().insert(basename.to_string());
  }

  pub fn delete_attempts(&self) -> Vec<String> {
    self.delete_attempts.lock().clone()
  }

  pub fn contains(&self, reference: &str) -> bool {
    basename_of(reference)
      .map(|name| self.stored.lock().contains(name))
      .unwrap_or(false)
  }

  pub fn stored_count(&self) -> usize {
    self.stored.lock().len()
  }
}

#[async_trait]
impl FileStore for RecordingFileStore {
  async fn save(&self, stored_name: &str, original_name: &str, _bytes: &[u8]) -> CatalogResult<StoredFile> {
    self.stored.lock().insert(stored_name.to_string());
    Ok(StoredFile {
      path: PathBuf::from("/srv/uploads").join(stored_name),
      original_name: original_name.to_string(),
    })
  }

  fn reference_for(&self, file: &StoredFile) -> CatalogResult<String> {
    Ok(public_reference(BASE_URL, file_basename(&file.path)?))
  }

  async fn delete(&self, reference: &str) -> CatalogResult<()> {
    self.delete_attempts.lock().push(reference.to_string());
    let name = basename_of(reference)?.to_string();
    if self.failing.lock().contains(&name) {
      return Err(CatalogError::FileStore {
        reference: reference.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"),
      });
    }
    self.stored.lock().remove(&name);
    Ok(())
  }
}

// --- Fixtures ---
pub fn sample_fields(name: &str, stock: i32) -> ProductFields {
  ProductFields {
    name: name.to_string(),
    category: "coffee".to_string(),
    price_cents: 1_250,
    net_weight_grams: 500,
    description: format!("{} roasted in small batches", name),
    characteristics: Some("notes of cocoa".to_string()),
    stock,
    brand: None,
  }
}

pub fn new_product(supplier_id: Uuid, name: &str) -> NewProduct {
  NewProduct {
    supplier_id,
    fields: sample_fields(name, 10),
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
