// shopfront/src/compensation.rs

//! Best-effort removal of files that a failed or completed write no longer
//! references.

use crate::store::FileStore;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// What a cleanup pass did. One entry per reference, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
  pub removed: Vec<String>,
  pub failed: Vec<String>,
}

impl CleanupReport {
  pub fn attempted(&self) -> usize {
    self.removed.len() + self.failed.len()
  }

  pub fn is_clean(&self) -> bool {
    self.failed.is_empty()
  }
}

/// Deletes every reference from `store`, one attempt each. Never fails: a
/// failed deletion is logged and recorded, and the remaining references are
/// still processed.
#[instrument(name = "compensation::delete_files", skip_all, fields(count = references.len()))]
pub async fn delete_files<S>(store: &S, references: &[String]) -> CleanupReport
where
  S: FileStore + ?Sized,
{
  let mut report = CleanupReport::default();
  for reference in references {
    match store.delete(reference).await {
      Ok(()) => report.removed.push(reference.clone()),
      Err(e) => {
        warn!(reference = %reference, error = %e, "Failed to delete stored file; it is now orphaned.");
        report.failed.push(reference.clone());
      }
    }
  }
  if !references.is_empty() {
    info!(
      removed = report.removed.len(),
      failed = report.failed.len(),
      "File cleanup finished."
    );
  }
  report
}
