use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PostgresStore;

/// Errors from the record store collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Store query failed: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One owner's stall listing draft. At most one row per owner is
/// authoritative; when history exists, the latest `created_at` wins.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub owner_email: String,
    pub slug: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// Table-style capability interface over the external record store.
///
/// Covers the three logical tables the app touches: the owners allowlist,
/// the clubs allowlist, and the submissions table. Individual calls are
/// atomic at the store; multi-step sequences built on top of them are not.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Membership check against the stall-owners allowlist.
    async fn owner_allowlisted(&self, email: &str) -> Result<bool, StoreError>;

    /// Membership check against the clubs allowlist.
    async fn club_allowlisted(&self, email: &str) -> Result<bool, StoreError>;

    /// Most-recently-created submission for an owner, if any.
    async fn latest_for_owner(&self, email: &str) -> Result<Option<Submission>, StoreError>;

    /// Any submission (any owner) currently holding this slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Submission>, StoreError>;

    /// Insert a fresh row; the store assigns id and created_at.
    async fn insert(
        &self,
        owner_email: &str,
        slug: &str,
        payload: &Value,
    ) -> Result<Submission, StoreError>;

    /// Replace slug and payload in place; id and created_at are preserved.
    async fn update(&self, id: Uuid, slug: &str, payload: &Value)
        -> Result<Submission, StoreError>;

    /// Delete every row for the owner, returning the count removed.
    async fn delete_for_owner(&self, email: &str) -> Result<u64, StoreError>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
