use thiserror::Error;

use crate::store::{StoreError, SubmissionStore};

#[derive(Debug, Error)]
pub enum AllowlistError {
    #[error("Allowlist lookup failed: {0}")]
    Query(#[source] StoreError),

    #[error("Email is not on the stall owner or club allowlists")]
    NotAuthorized,
}

/// Check a normalized email against the owners and clubs allowlists.
///
/// Membership in either list is sufficient. The two lookups run
/// concurrently; a lookup error on either side is an infrastructure
/// failure, distinct from a clean "not authorized" denial.
pub async fn require_allowlisted(
    store: &dyn SubmissionStore,
    email: &str,
) -> Result<(), AllowlistError> {
    let (owner, club) = futures::future::try_join(
        store.owner_allowlisted(email),
        store.club_allowlisted(email),
    )
    .await
    .map_err(AllowlistError::Query)?;

    if owner || club {
        Ok(())
    } else {
        Err(AllowlistError::NotAuthorized)
    }
}
