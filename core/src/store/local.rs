// shopfront/src/store/local.rs

use super::{basename_of, file_basename, public_reference, FileStore, StoredFile};
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Stores files flat under a single directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
  root: PathBuf,
  public_base_url: String,
}

impl LocalFileStore {
  pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      public_base_url: public_base_url.into(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Creates the root directory if it does not exist yet.
  pub async fn ensure_root(&self) -> CatalogResult<()> {
    fs::create_dir_all(&self.root).await.map_err(|e| CatalogError::FileStore {
      reference: self.root.display().to_string(),
      source: e,
    })?;
    info!(root = %self.root.display(), "Upload directory ready.");
    Ok(())
  }

  fn path_for(&self, basename: &str) -> PathBuf {
    self.root.join(basename)
  }

  /// Reads a stored file by its basename. `Ok(None)` when it does not exist.
  pub async fn read(&self, basename: &str) -> CatalogResult<Option<Vec<u8>>> {
    let name = basename_of(basename)?;
    if name != basename {
      return Err(CatalogError::InvalidReference(basename.to_string()));
    }
    match fs::read(self.path_for(name)).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(CatalogError::FileStore {
        reference: basename.to_string(),
        source: e,
      }),
    }
  }
}

#[async_trait]
impl FileStore for LocalFileStore {
  #[instrument(name = "LocalFileStore::save", skip(self, bytes), fields(size = bytes.len()), err(Display))]
  async fn save(&self, stored_name: &str, original_name: &str, bytes: &[u8]) -> CatalogResult<StoredFile> {
    let name = basename_of(stored_name)?;
    if name != stored_name {
      return Err(CatalogError::InvalidReference(stored_name.to_string()));
    }
    let path = self.path_for(name);
    fs::write(&path, bytes).await.map_err(|e| CatalogError::FileStore {
      reference: stored_name.to_string(),
      source: e,
    })?;
    debug!(path = %path.display(), "Stored upload.");
    Ok(StoredFile {
      path,
      original_name: original_name.to_string(),
    })
  }

  fn reference_for(&self, file: &StoredFile) -> CatalogResult<String> {
    Ok(public_reference(&self.public_base_url, file_basename(&file.path)?))
  }

  #[instrument(name = "LocalFileStore::delete", skip(self), err(Display))]
  async fn delete(&self, reference: &str) -> CatalogResult<()> {
    let path = self.path_for(basename_of(reference)?);
    match fs::remove_file(&path).await {
      Ok(()) => {
        debug!(path = %path.display(), "Removed stored file.");
        Ok(())
      }
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %path.display(), "Stored file already absent.");
        Ok(())
      }
      Err(e) => Err(CatalogError::FileStore {
        reference: reference.to_string(),
        source: e,
      }),
    }
  }
}
