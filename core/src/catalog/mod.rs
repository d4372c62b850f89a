// shopfront/src/catalog/mod.rs

//! Relational store seam for the catalog.
//!
//! `CatalogStore`/`CatalogTx` carry the write path: every mutation runs inside
//! a transaction obtained from `begin`, and ends in exactly one of `commit` or
//! `rollback`. `CatalogReader` carries the side-effect-free read views.

pub mod memory;
pub mod postgres;
pub mod shaping;

pub use memory::{FailPoint, MemoryCatalog};
pub use postgres::PgCatalog;

use crate::error::CatalogResult;
use crate::model::{BestSeller, Product, ProductDetail, ProductFields};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CatalogStore: Send + Sync {
  type Tx: CatalogTx;

  async fn begin(&self) -> CatalogResult<Self::Tx>;
}

/// An open transaction. Dropping it without `commit` discards its writes.
#[async_trait]
pub trait CatalogTx: Send + Sized {
  async fn insert_product(&mut self, product: &Product) -> CatalogResult<()>;

  /// Inserts one image row per reference in a single statement, preserving order.
  async fn insert_images(&mut self, product_id: Uuid, references: &[String]) -> CatalogResult<u64>;

  /// Updates the product only if it belongs to `supplier_id`. Returns matched rows.
  async fn update_product(&mut self, product_id: Uuid, supplier_id: Uuid, fields: &ProductFields)
    -> CatalogResult<u64>;

  /// Image references of the product, seen through the ownership filter.
  async fn owned_image_references(&mut self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<Vec<String>>;

  /// Deletes the product and its image rows if it belongs to `supplier_id`.
  /// Returns the number of product rows deleted.
  async fn delete_product(&mut self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<u64>;

  async fn commit(self) -> CatalogResult<()>;

  async fn rollback(self) -> CatalogResult<()>;
}

#[async_trait]
pub trait CatalogReader: Send + Sync {
  /// Newest first, optionally filtered by a case-insensitive substring of the name.
  async fn find_products_by_supplier(&self, supplier_id: Uuid, search: Option<&str>) -> CatalogResult<Vec<Product>>;

  /// Products with stock, newest first.
  async fn find_all_public_products(&self) -> CatalogResult<Vec<Product>>;

  async fn find_product_by_id(&self, product_id: Uuid) -> CatalogResult<Option<ProductDetail>>;

  /// Products ranked by number of order lines, products never sold excluded.
  async fn find_best_sellers(&self, limit: u32) -> CatalogResult<Vec<BestSeller>>;
}
