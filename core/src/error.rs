// shopfront/src/error.rs
use crate::compensation::CleanupReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("File store operation failed for '{reference}': {source}")]
  FileStore {
    reference: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Invalid file reference: {0}")]
  InvalidReference(String),

  #[error("Upload rejected: {0}")]
  UploadRejected(String),

  /// A write transaction was rolled back. `cleanup` records what happened to
  /// the files that had been persisted for the failed write; its failures
  /// never replace `source`.
  #[error("Transaction rolled back: {source}")]
  TransactionFailed {
    #[source]
    source: Box<CatalogError>,
    cleanup: CleanupReport,
  },

  /// Removing the product would break rows that still point at it, such as
  /// order items.
  #[error("Product is still referenced: {0}")]
  StillReferenced(String),

  #[error("Internal catalog error: {0}")]
  Internal(String),
}

impl CatalogError {
  /// The error that caused a rollback, or `self` for any other kind.
  pub fn root_cause(&self) -> &CatalogError {
    match self {
      CatalogError::TransactionFailed { source, .. } => source.root_cause(),
      other => other,
    }
  }
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
