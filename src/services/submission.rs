use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::slug::{resolve_slug, SlugError};
use crate::store::{StoreError, Submission, SubmissionStore};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Slug(#[from] SlugError),

    #[error("Submission write failed: {0}")]
    Persistence(#[source] StoreError),
}

/// The owner's current submission: latest row by creation time, or none.
pub async fn fetch_current(
    store: &dyn SubmissionStore,
    owner_email: &str,
) -> Result<Option<Submission>, StoreError> {
    store.latest_for_owner(owner_email).await
}

/// Create-or-replace the owner's submission.
///
/// Looks up the owner's latest row once, resolves the slug against it (so
/// an unchanged name maps back to the same slug), then either updates that
/// row in place or inserts a fresh one. The read and the write are separate
/// store calls; the store's per-call atomicity is the only serialization.
pub async fn save(
    store: &dyn SubmissionStore,
    owner_email: &str,
    payload: Value,
) -> Result<Submission, SaveError> {
    let name = payload.get("name").and_then(Value::as_str).unwrap_or_default();

    let existing = store
        .latest_for_owner(owner_email)
        .await
        .map_err(SaveError::Persistence)?;

    let slug = resolve_slug(store, name, existing.as_ref()).await?;

    let saved = match existing {
        Some(row) => store
            .update(row.id, &slug, &payload)
            .await
            .map_err(SaveError::Persistence)?,
        None => store
            .insert(owner_email, &slug, &payload)
            .await
            .map_err(SaveError::Persistence)?,
    };

    info!(owner = %owner_email, slug = %saved.slug, "Saved submission");
    Ok(saved)
}

/// Remove every row for the owner, not just the latest one.
pub async fn delete_all(
    store: &dyn SubmissionStore,
    owner_email: &str,
) -> Result<u64, StoreError> {
    let deleted = store.delete_for_owner(owner_email).await?;
    info!(owner = %owner_email, deleted, "Deleted submissions");
    Ok(deleted)
}
