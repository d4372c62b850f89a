// shopfront/src/writer.rs

//! Transactional product writes.
//!
//! Uploaded files are persisted before any of these operations is called and
//! are not covered by the database transaction. Each operation therefore
//! finishes the transaction first and only then touches the file store:
//! - create/update: on failure, roll back, then delete the files supplied
//!   with the request;
//! - delete: after a commit that removed the product, delete its files.

use crate::catalog::{CatalogStore, CatalogTx};
use crate::compensation::{delete_files, CleanupReport};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{NewProduct, Product, ProductFields, UpdateOutcome};
use crate::store::{FileStore, StoredFile};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
  /// Product rows deleted; 0 means "not found or not yours".
  pub affected: u64,
  /// Files removed after the commit. Empty when nothing was deleted.
  pub cleanup: CleanupReport,
}

pub struct ProductWriter<C> {
  catalog: C,
  files: Arc<dyn FileStore>,
}

impl<C: CatalogStore> ProductWriter<C> {
  pub fn new(catalog: C, files: Arc<dyn FileStore>) -> Self {
    Self { catalog, files }
  }

  /// Inserts a product and one image row per stored file, atomically.
  #[instrument(
    name = "ProductWriter::create_product",
    skip_all,
    fields(supplier_id = %new_product.supplier_id, images = stored_files.len()),
    err(Display)
  )]
  pub async fn create_product(&self, new_product: NewProduct, stored_files: &[StoredFile]) -> CatalogResult<Product> {
    let references = self.references_for(stored_files).await?;
    let product = Product {
      id: Uuid::new_v4(),
      supplier_id: new_product.supplier_id,
      fields: new_product.fields,
      images: references,
      created_at: Utc::now(),
    };

    let tx = self.begin_or_compensate(&product.images).await?;
    let written = write_new_product(tx, &product).await;
    match written {
      Ok(()) => {
        info!(product_id = %product.id, "Product created.");
        Ok(product)
      }
      Err(e) => Err(self.compensate(e, &product.images).await),
    }
  }

  /// Updates an owned product and appends images for `new_files`. Existing
  /// images are kept. When the product is not found or not owned, nothing is
  /// written and the new files are removed.
  #[instrument(
    name = "ProductWriter::update_product_by_id",
    skip(self, fields, new_files),
    fields(images = new_files.len()),
    err(Display)
  )]
  pub async fn update_product_by_id(
    &self,
    product_id: Uuid,
    supplier_id: Uuid,
    fields: ProductFields,
    new_files: &[StoredFile],
  ) -> CatalogResult<UpdateOutcome> {
    let references = self.references_for(new_files).await?;
    let mut tx = self.begin_or_compensate(&references).await?;

    let matched = match tx.update_product(product_id, supplier_id, &fields).await {
      Ok(matched) => matched,
      Err(e) => {
        rollback_quietly(tx).await;
        return Err(self.compensate(e, &references).await);
      }
    };

    if matched == 0 {
      rollback_quietly(tx).await;
      warn!("Update matched no product owned by this supplier.");
      if !references.is_empty() {
        delete_files(self.files.as_ref(), &references).await;
      }
      return Ok(UpdateOutcome {
        matched: 0,
        images_added: 0,
      });
    }

    match append_images(tx, product_id, &references).await {
      Ok(()) => {
        info!(matched, images_added = references.len(), "Product updated.");
        Ok(UpdateOutcome {
          matched,
          images_added: references.len(),
        })
      }
      Err(e) => Err(self.compensate(e, &references).await),
    }
  }

  /// Deletes an owned product with its image rows, then its files.
  #[instrument(name = "ProductWriter::delete_product_by_id", skip(self), err(Display))]
  pub async fn delete_product_by_id(&self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<DeleteOutcome> {
    let mut tx = self.catalog.begin().await?;

    let deleted = async {
      let references = tx.owned_image_references(product_id, supplier_id).await?;
      let affected = tx.delete_product(product_id, supplier_id).await?;
      Ok::<_, CatalogError>((references, affected))
    }
    .await;

    let (references, affected) = match deleted {
      Ok(found) => found,
      Err(e) => {
        rollback_quietly(tx).await;
        return Err(CatalogError::TransactionFailed {
          source: Box::new(e),
          cleanup: CleanupReport::default(),
        });
      }
    };

    if let Err(e) = tx.commit().await {
      return Err(CatalogError::TransactionFailed {
        source: Box::new(e),
        cleanup: CleanupReport::default(),
      });
    }

    let cleanup = if affected > 0 {
      info!(images = references.len(), "Product deleted.");
      delete_files(self.files.as_ref(), &references).await
    } else {
      warn!("Delete matched no product owned by this supplier.");
      CleanupReport::default()
    };
    Ok(DeleteOutcome { affected, cleanup })
  }

  /// Public references for stored files. If one cannot be derived, the
  /// request's files are unusable and are removed.
  async fn references_for(&self, stored_files: &[StoredFile]) -> CatalogResult<Vec<String>> {
    let derived: CatalogResult<Vec<String>> = stored_files.iter().map(|f| self.files.reference_for(f)).collect();
    match derived {
      Ok(references) => Ok(references),
      Err(e) => {
        let paths: Vec<String> = stored_files.iter().map(|f| f.path.display().to_string()).collect();
        let cleanup = delete_files(self.files.as_ref(), &paths).await;
        Err(CatalogError::TransactionFailed {
          source: Box::new(e),
          cleanup,
        })
      }
    }
  }

  async fn begin_or_compensate(&self, references: &[String]) -> CatalogResult<C::Tx> {
    match self.catalog.begin().await {
      Ok(tx) => Ok(tx),
      Err(e) => Err(self.compensate(e, references).await),
    }
  }

  /// Removes files orphaned by a rolled-back write and wraps the original error.
  async fn compensate(&self, source: CatalogError, references: &[String]) -> CatalogError {
    error!(error = %source, files = references.len(), "Write failed; removing uploaded files.");
    let cleanup = delete_files(self.files.as_ref(), references).await;
    CatalogError::TransactionFailed {
      source: Box::new(source),
      cleanup,
    }
  }
}

/// Runs the insert statements of a create and commits, rolling back on error.
async fn write_new_product<T: CatalogTx>(mut tx: T, product: &Product) -> CatalogResult<()> {
  let inserted = async {
    tx.insert_product(product).await?;
    tx.insert_images(product.id, &product.images).await?;
    Ok::<_, CatalogError>(())
  }
  .await;
  match inserted {
    Ok(()) => tx.commit().await,
    Err(e) => {
      rollback_quietly(tx).await;
      Err(e)
    }
  }
}

/// Appends image rows to an already updated product and commits.
async fn append_images<T: CatalogTx>(mut tx: T, product_id: Uuid, references: &[String]) -> CatalogResult<()> {
  match tx.insert_images(product_id, references).await {
    Ok(_) => tx.commit().await,
    Err(e) => {
      rollback_quietly(tx).await;
      Err(e)
    }
  }
}

async fn rollback_quietly<T: CatalogTx>(tx: T) {
  if let Err(e) = tx.rollback().await {
    warn!(error = %e, "Rollback failed; the transaction is discarded when the connection is released.");
  }
}
