use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config;
use crate::store::{StoreError, Submission, SubmissionStore};

const SUBMISSION_COLUMNS: &str = "id, owner_email, slug, payload, created_at";

/// sqlx-backed implementation against the three Postgres tables:
/// stall_owners, clubs, stall_submissions.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a store from DATABASE_URL. The pool connects lazily so startup
    /// does not require the database to be reachable yet.
    pub fn from_env() -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config::config().database.max_connections)
            .connect_lazy(&url)?;

        info!("Created database pool");
        Ok(Self { pool })
    }

    async fn allowlisted(&self, table: &str, email: &str) -> Result<bool, StoreError> {
        // Table name comes from the two call sites below, never from input
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE email = $1)", table);
        let exists: (bool,) = sqlx::query_as(&sql).bind(email).fetch_one(&self.pool).await?;
        Ok(exists.0)
    }
}

#[async_trait]
impl SubmissionStore for PostgresStore {
    async fn owner_allowlisted(&self, email: &str) -> Result<bool, StoreError> {
        self.allowlisted("stall_owners", email).await
    }

    async fn club_allowlisted(&self, email: &str) -> Result<bool, StoreError> {
        self.allowlisted("clubs", email).await
    }

    async fn latest_for_owner(&self, email: &str) -> Result<Option<Submission>, StoreError> {
        let sql = format!(
            "SELECT {} FROM stall_submissions WHERE owner_email = $1 \
             ORDER BY created_at DESC LIMIT 1",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Submission>, StoreError> {
        let sql = format!(
            "SELECT {} FROM stall_submissions WHERE slug = $1 LIMIT 1",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as(&sql).bind(slug).fetch_optional(&self.pool).await?)
    }

    async fn insert(
        &self,
        owner_email: &str,
        slug: &str,
        payload: &Value,
    ) -> Result<Submission, StoreError> {
        let sql = format!(
            "INSERT INTO stall_submissions (owner_email, slug, payload) \
             VALUES ($1, $2, $3) RETURNING {}",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as(&sql)
            .bind(owner_email)
            .bind(slug)
            .bind(payload)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        payload: &Value,
    ) -> Result<Submission, StoreError> {
        let sql = format!(
            "UPDATE stall_submissions SET slug = $2, payload = $3 \
             WHERE id = $1 RETURNING {}",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .bind(slug)
            .bind(payload)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_for_owner(&self, email: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM stall_submissions WHERE owner_email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
