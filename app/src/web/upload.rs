// shopfront_app/src/web/upload.rs

//! Reads a multipart product submission: text fields are collected, image
//! files are checked against the upload policy and persisted to the file store
//! as they arrive.

use crate::errors::{AppError, Result};
use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use shopfront::store::upload::{stored_file_name, PRODUCT_IMAGES_FIELD};
use shopfront::{delete_files, FileStore, StoredFile, UploadPolicy};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Upper bound for a single text field.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct ProductSubmission {
  pub text_fields: HashMap<String, String>,
  pub files: Vec<StoredFile>,
}

/// Consumes the multipart stream. If reading fails part-way, files already
/// persisted for this request are removed before the error is returned.
#[instrument(name = "upload::read_product_submission", skip_all, err(Display))]
pub async fn read_product_submission(
  mut payload: Multipart,
  store: &dyn FileStore,
  policy: &UploadPolicy,
) -> Result<ProductSubmission> {
  let mut submission = ProductSubmission::default();
  let read = read_fields(&mut payload, store, policy, &mut submission).await;
  match read {
    Ok(()) => {
      info!(
        files = submission.files.len(),
        fields = submission.text_fields.len(),
        "Product submission received."
      );
      Ok(submission)
    }
    Err(e) => {
      discard_files(store, &submission.files).await;
      Err(e)
    }
  }
}

async fn read_fields(
  payload: &mut Multipart,
  store: &dyn FileStore,
  policy: &UploadPolicy,
  submission: &mut ProductSubmission,
) -> Result<()> {
  while let Some(mut field) = payload.try_next().await? {
    let name = field
      .name()
      .map(str::to_string)
      .ok_or_else(|| AppError::Validation("Multipart field without a name".to_string()))?;
    let filename = field
      .content_disposition()
      .and_then(|cd| cd.get_filename())
      .map(str::to_string);

    match filename {
      // A file input left empty arrives as a part with an empty filename
      Some(original_name) if original_name.is_empty() => {
        while field.try_next().await?.is_some() {}
        debug!(field = %name, "Skipped empty file part.");
      }
      Some(original_name) => {
        if name != PRODUCT_IMAGES_FIELD {
          return Err(AppError::Validation(format!("Unexpected file field '{}'", name)));
        }
        policy.check_count(submission.files.len() + 1)?;
        let content_type = field.content_type().map(|m| m.essence_str().to_string());
        let extension = policy.check_image(&original_name, content_type.as_deref())?;
        let bytes = read_limited(field, policy.max_file_bytes, |size| {
          policy
            .check_size(&original_name, size)
            .map_err(|e| AppError::PayloadTooLarge(e.to_string()))
        })
        .await?;
        let stored = store
          .save(&stored_file_name(&name, &extension), &original_name, &bytes)
          .await?;
        debug!(path = %stored.path.display(), size = bytes.len(), "Image persisted.");
        submission.files.push(stored);
      }
      None => {
        let bytes = read_limited(field, MAX_TEXT_FIELD_BYTES, |_| {
          Err(AppError::PayloadTooLarge(format!("Field '{}' is too long", name)))
        })
        .await?;
        let value =
          String::from_utf8(bytes).map_err(|_| AppError::Validation(format!("Field '{}' is not valid UTF-8", name)))?;
        submission.text_fields.insert(name, value);
      }
    }
  }
  Ok(())
}

/// Collects a field's body, calling `on_overflow` with the running size as
/// soon as it exceeds `limit`.
async fn read_limited<F>(mut field: Field, limit: usize, on_overflow: F) -> Result<Vec<u8>>
where
  F: Fn(usize) -> Result<()>,
{
  let mut bytes = Vec::new();
  while let Some(chunk) = field.try_next().await? {
    bytes.extend_from_slice(&chunk);
    if bytes.len() > limit {
      on_overflow(bytes.len())?;
    }
  }
  Ok(bytes)
}

/// Removes files persisted for a request that is being rejected.
pub async fn discard_files(store: &dyn FileStore, files: &[StoredFile]) {
  if files.is_empty() {
    return;
  }
  let references: Vec<String> = files
    .iter()
    .map(|f| store.reference_for(f).unwrap_or_else(|_| f.path.display().to_string()))
    .collect();
  delete_files(store, &references).await;
}
