// shopfront/src/catalog/memory.rs

//! In-memory catalog for tests and local runs without a database.
//!
//! A transaction works on a private copy of the state and publishes it on
//! commit, so uncommitted writes are never visible. Concurrent transactions
//! are not isolated from each other: the last commit wins. Failures can be
//! injected at any step with [`MemoryCatalog::fail_at`].

use super::{CatalogReader, CatalogStore, CatalogTx};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{BestSeller, Product, ProductDetail, ProductFields};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

/// Step at which the next transactions fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
  Begin,
  InsertProduct,
  InsertImages,
  UpdateProduct,
  DeleteProduct,
  Commit,
}

#[derive(Debug, Clone)]
struct ProductRecord {
  product: Product,
  seq: u64,
}

#[derive(Debug, Clone)]
struct ImageRow {
  id: u64,
  product_id: Uuid,
  image_url: String,
}

#[derive(Debug, Clone, Default)]
struct CatalogState {
  products: BTreeMap<Uuid, ProductRecord>,
  images: Vec<ImageRow>,
  next_image_id: u64,
  next_seq: u64,
  /// One entry per order line.
  order_items: Vec<Uuid>,
  reviews: Vec<(Uuid, u8)>,
}

impl CatalogState {
  fn images_of(&self, product_id: Uuid) -> Vec<String> {
    let mut rows: Vec<&ImageRow> = self.images.iter().filter(|r| r.product_id == product_id).collect();
    rows.sort_by_key(|r| r.id);
    rows.into_iter().map(|r| r.image_url.clone()).collect()
  }

  fn view(&self, record: &ProductRecord) -> Product {
    Product {
      images: self.images_of(record.product.id),
      ..record.product.clone()
    }
  }

  /// Records sorted newest first; insertion order breaks timestamp ties.
  fn newest_first(&self) -> Vec<&ProductRecord> {
    let mut records: Vec<&ProductRecord> = self.products.values().collect();
    records.sort_by(|a, b| {
      b.product
        .created_at
        .cmp(&a.product.created_at)
        .then(b.seq.cmp(&a.seq))
    });
    records
  }

  fn owned(&self, product_id: Uuid, supplier_id: Uuid) -> bool {
    self
      .products
      .get(&product_id)
      .is_some_and(|r| r.product.supplier_id == supplier_id)
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
  state: Arc<Mutex<CatalogState>>,
  fail_at: Arc<Mutex<Option<FailPoint>>>,
}

impl MemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes every transaction begun from now on fail at `point`.
  pub fn fail_at(&self, point: FailPoint) {
    *self.fail_at.lock() = Some(point);
  }

  pub fn clear_failures(&self) {
    *self.fail_at.lock() = None;
  }

  /// Number of committed product rows.
  pub fn product_count(&self) -> usize {
    self.state.lock().products.len()
  }

  /// Number of committed image rows across all products.
  pub fn image_row_count(&self) -> usize {
    self.state.lock().images.len()
  }

  /// Committed image references of one product, in insertion order.
  pub fn image_rows(&self, product_id: Uuid) -> Vec<String> {
    self.state.lock().images_of(product_id)
  }

  /// Records one order line for `product_id`.
  pub fn record_sale(&self, product_id: Uuid) {
    self.state.lock().order_items.push(product_id);
  }

  pub fn record_review(&self, product_id: Uuid, rating: u8) {
    self.state.lock().reviews.push((product_id, rating));
  }
}

pub struct MemoryCatalogTx {
  base: Arc<Mutex<CatalogState>>,
  staged: CatalogState,
  fail_at: Option<FailPoint>,
}

impl MemoryCatalogTx {
  fn check(&self, point: FailPoint) -> CatalogResult<()> {
    if self.fail_at == Some(point) {
      return Err(CatalogError::Internal(format!("injected failure at {:?}", point)));
    }
    Ok(())
  }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
  type Tx = MemoryCatalogTx;

  async fn begin(&self) -> CatalogResult<MemoryCatalogTx> {
    let fail_at = *self.fail_at.lock();
    if fail_at == Some(FailPoint::Begin) {
      return Err(CatalogError::Internal("injected failure at Begin".to_string()));
    }
    let staged = self.state.lock().clone();
    Ok(MemoryCatalogTx {
      base: Arc::clone(&self.state),
      staged,
      fail_at,
    })
  }
}

#[async_trait]
impl CatalogTx for MemoryCatalogTx {
  async fn insert_product(&mut self, product: &Product) -> CatalogResult<()> {
    self.check(FailPoint::InsertProduct)?;
    if self.staged.products.contains_key(&product.id) {
      return Err(CatalogError::Internal(format!("duplicate product id {}", product.id)));
    }
    let seq = self.staged.next_seq;
    self.staged.next_seq += 1;
    let product = Product {
      images: Vec::new(),
      ..product.clone()
    };
    self.staged.products.insert(product.id, ProductRecord { product, seq });
    Ok(())
  }

  async fn insert_images(&mut self, product_id: Uuid, references: &[String]) -> CatalogResult<u64> {
    self.check(FailPoint::InsertImages)?;
    if references.is_empty() {
      return Ok(0);
    }
    if !self.staged.products.contains_key(&product_id) {
      return Err(CatalogError::Internal(format!(
        "foreign key violation: product {} does not exist",
        product_id
      )));
    }
    for reference in references {
      let id = self.staged.next_image_id;
      self.staged.next_image_id += 1;
      self.staged.images.push(ImageRow {
        id,
        product_id,
        image_url: reference.clone(),
      });
    }
    Ok(references.len() as u64)
  }

  async fn update_product(
    &mut self,
    product_id: Uuid,
    supplier_id: Uuid,
    fields: &ProductFields,
  ) -> CatalogResult<u64> {
    self.check(FailPoint::UpdateProduct)?;
    match self.staged.products.get_mut(&product_id) {
      Some(record) if record.product.supplier_id == supplier_id => {
        record.product.fields = fields.clone();
        Ok(1)
      }
      _ => Ok(0),
    }
  }

  async fn owned_image_references(&mut self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<Vec<String>> {
    if !self.staged.owned(product_id, supplier_id) {
      return Ok(Vec::new());
    }
    Ok(self.staged.images_of(product_id))
  }

  async fn delete_product(&mut self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<u64> {
    self.check(FailPoint::DeleteProduct)?;
    if !self.staged.owned(product_id, supplier_id) {
      return Ok(0);
    }
    if self.staged.order_items.contains(&product_id) {
      return Err(CatalogError::StillReferenced(format!(
        "product {} has order items",
        product_id
      )));
    }
    self.staged.images.retain(|r| r.product_id != product_id);
    self.staged.products.remove(&product_id);
    Ok(1)
  }

  async fn commit(self) -> CatalogResult<()> {
    self.check(FailPoint::Commit)?;
    *self.base.lock() = self.staged;
    Ok(())
  }

  async fn rollback(self) -> CatalogResult<()> {
    Ok(())
  }
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
  async fn find_products_by_supplier(&self, supplier_id: Uuid, search: Option<&str>) -> CatalogResult<Vec<Product>> {
    let needle = search
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| s.to_lowercase());
    let state = self.state.lock();
    Ok(
      state
        .newest_first()
        .into_iter()
        .filter(|r| r.product.supplier_id == supplier_id)
        .filter(|r| match &needle {
          Some(n) => r.product.fields.name.to_lowercase().contains(n.as_str()),
          None => true,
        })
        .map(|r| state.view(r))
        .collect(),
    )
  }

  async fn find_all_public_products(&self) -> CatalogResult<Vec<Product>> {
    let state = self.state.lock();
    Ok(
      state
        .newest_first()
        .into_iter()
        .filter(|r| r.product.fields.stock > 0)
        .map(|r| state.view(r))
        .collect(),
    )
  }

  async fn find_product_by_id(&self, product_id: Uuid) -> CatalogResult<Option<ProductDetail>> {
    let state = self.state.lock();
    let Some(record) = state.products.get(&product_id) else {
      return Ok(None);
    };
    let ratings: Vec<u8> = state
      .reviews
      .iter()
      .filter(|(id, _)| *id == product_id)
      .map(|(_, rating)| *rating)
      .collect();
    let avg_rating = if ratings.is_empty() {
      None
    } else {
      Some(ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64)
    };
    Ok(Some(ProductDetail {
      product: state.view(record),
      avg_rating,
      review_count: ratings.len() as i64,
    }))
  }

  async fn find_best_sellers(&self, limit: u32) -> CatalogResult<Vec<BestSeller>> {
    let state = self.state.lock();
    let mut sales: HashMap<Uuid, i64> = HashMap::new();
    for product_id in &state.order_items {
      *sales.entry(*product_id).or_default() += 1;
    }
    // Stable sort over newest-first keeps the same tie order as the SQL query.
    let mut ranked: Vec<(&ProductRecord, i64)> = state
      .newest_first()
      .into_iter()
      .filter(|r| r.product.fields.stock > 0)
      .filter_map(|r| sales.get(&r.product.id).map(|count| (r, *count)))
      .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(
      ranked
        .into_iter()
        .take(limit as usize)
        .map(|(r, sales_count)| BestSeller {
          product: state.view(r),
          sales_count,
        })
        .collect(),
    )
  }
}
