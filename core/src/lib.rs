// shopfront/src/lib.rs

//! Shopfront: the product catalog core of a storefront backend.
//!
//!  - Transactional product writes (`ProductWriter`) over a relational store.
//!  - Compensation: files persisted for a write that rolled back are removed.
//!  - A file store adapter with an upload acceptance policy.
//!  - Side-effect-free catalog read views (`CatalogReader`).

pub mod catalog;
pub mod compensation;
pub mod error;
pub mod model;
pub mod store;
pub mod writer;

// --- Re-exports for the Public API ---

pub use crate::catalog::{CatalogReader, CatalogStore, CatalogTx, FailPoint, MemoryCatalog, PgCatalog};
pub use crate::compensation::{delete_files, CleanupReport};
pub use crate::error::{CatalogError, CatalogResult};
pub use crate::model::{BestSeller, NewProduct, Product, ProductDetail, ProductFields, UpdateOutcome};
pub use crate::store::{FileStore, LocalFileStore, StoredFile, UploadPolicy};
pub use crate::writer::{DeleteOutcome, ProductWriter};

/*
    Write path, as wired by the server:
    1. The upload handler checks each file against `UploadPolicy` and saves it
       through a `FileStore`, collecting `StoredFile`s.
    2. It calls `ProductWriter::create_product` (or `update_product_by_id`)
       with the parsed fields and the stored files.
    3. The writer inserts inside one transaction. If anything fails it rolls
       back and runs `delete_files` over the stored files before returning
       `CatalogError::TransactionFailed`.
    4. `delete_product_by_id` removes rows first and files only after commit.
*/
