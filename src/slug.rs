use thiserror::Error;

use crate::store::{StoreError, Submission, SubmissionStore};

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("Stall name must contain at least one letter or digit")]
    InvalidName,

    #[error("Slug lookup failed: {0}")]
    Query(#[from] StoreError),
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, trims, drops straight and curly quotes, collapses every run
/// of characters outside [a-z0-9] into a single hyphen, and strips leading
/// and trailing hyphens. Returns an empty string for all-punctuation input.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for ch in raw.trim().to_lowercase().chars() {
        match ch {
            // Quotes vanish entirely so "Tom's" becomes "toms", not "tom-s"
            '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' => {}
            c if c.is_ascii_alphanumeric() => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                slug.push(c);
                pending_hyphen = false;
            }
            _ => pending_hyphen = true,
        }
    }

    slug
}

/// Resolve a display name to a slug unique across all submissions at the
/// moment of resolution, excluding the requester's own current row.
///
/// Sequential probe: try the base slug, then `{base}-2`, `{base}-3`, ...
/// until a candidate is free or held by `own_row`. A re-submission with an
/// unchanged name therefore keeps its slug instead of colliding with
/// itself. The probe and the eventual write are separate store calls, so
/// concurrent writers racing on the same base name are not serialized here.
pub async fn resolve_slug(
    store: &dyn SubmissionStore,
    name: &str,
    own_row: Option<&Submission>,
) -> Result<String, SlugError> {
    let base = slugify(name);
    if base.is_empty() {
        return Err(SlugError::InvalidName);
    }

    let mut candidate = base.clone();
    let mut suffix = 2u32;
    loop {
        match store.find_by_slug(&candidate).await? {
            None => return Ok(candidate),
            Some(row) if own_row.map(|own| own.id) == Some(row.id) => return Ok(candidate),
            Some(_) => {
                candidate = format!("{}-{}", base, suffix);
                suffix += 1;
            }
        }
    }
}
