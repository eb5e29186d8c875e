use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use uuid::Uuid;

use crate::identity::{IdentityProvider, Principal, ProviderError};
use crate::store::{StoreError, Submission, SubmissionStore};

/// In-memory double for the record store collaborator.
///
/// Rows get strictly increasing creation timestamps so "latest" ordering is
/// deterministic. Failure injection flips every lookup on a table group
/// into an error, for exercising the infrastructure-failure paths.
pub struct MemoryStore {
    owners: Mutex<HashSet<String>>,
    clubs: Mutex<HashSet<String>>,
    rows: Mutex<Vec<Submission>>,
    clock: AtomicI64,
    submission_ops: AtomicUsize,
    fail_allowlist: AtomicBool,
    fail_submissions: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            owners: Mutex::new(HashSet::new()),
            clubs: Mutex::new(HashSet::new()),
            rows: Mutex::new(Vec::new()),
            clock: AtomicI64::new(1_700_000_000),
            submission_ops: AtomicUsize::new(0),
            fail_allowlist: AtomicBool::new(false),
            fail_submissions: AtomicBool::new(false),
        }
    }

    pub fn allow_owner(&self, email: &str) {
        self.owners.lock().unwrap().insert(email.to_string());
    }

    pub fn allow_club(&self, email: &str) {
        self.clubs.lock().unwrap().insert(email.to_string());
    }

    /// Insert a row directly, bypassing the store trait and its counters.
    pub fn seed_row(&self, owner_email: &str, slug: &str, payload: Value) -> Submission {
        let row = self.build_row(owner_email, slug, &payload);
        self.rows.lock().unwrap().push(row.clone());
        row
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of operations that touched the submissions table.
    pub fn submission_ops(&self) -> usize {
        self.submission_ops.load(Ordering::Relaxed)
    }

    pub fn fail_allowlist_queries(&self) {
        self.fail_allowlist.store(true, Ordering::Relaxed);
    }

    pub fn fail_submission_queries(&self) {
        self.fail_submissions.store(true, Ordering::Relaxed);
    }

    fn build_row(&self, owner_email: &str, slug: &str, payload: &Value) -> Submission {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        Submission {
            id: Uuid::new_v4(),
            owner_email: owner_email.to_string(),
            slug: slug.to_string(),
            payload: payload.clone(),
            created_at: DateTime::from_timestamp(tick, 0).unwrap(),
        }
    }

    fn allowlist_guard(&self) -> Result<(), StoreError> {
        if self.fail_allowlist.load(Ordering::Relaxed) {
            Err(StoreError::QueryError("injected allowlist failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn submissions_guard(&self) -> Result<(), StoreError> {
        self.submission_ops.fetch_add(1, Ordering::Relaxed);
        if self.fail_submissions.load(Ordering::Relaxed) {
            Err(StoreError::QueryError("injected submissions failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn owner_allowlisted(&self, email: &str) -> Result<bool, StoreError> {
        self.allowlist_guard()?;
        Ok(self.owners.lock().unwrap().contains(email))
    }

    async fn club_allowlisted(&self, email: &str) -> Result<bool, StoreError> {
        self.allowlist_guard()?;
        Ok(self.clubs.lock().unwrap().contains(email))
    }

    async fn latest_for_owner(&self, email: &str) -> Result<Option<Submission>, StoreError> {
        self.submissions_guard()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.owner_email == email)
            .max_by_key(|row| row.created_at)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Submission>, StoreError> {
        self.submissions_guard()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.slug == slug)
            .cloned())
    }

    async fn insert(
        &self,
        owner_email: &str,
        slug: &str,
        payload: &Value,
    ) -> Result<Submission, StoreError> {
        self.submissions_guard()?;
        let row = self.build_row(owner_email, slug, payload);
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        payload: &Value,
    ) -> Result<Submission, StoreError> {
        self.submissions_guard()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| StoreError::QueryError(format!("no row with id {}", id)))?;
        row.slug = slug.to_string();
        row.payload = payload.clone();
        Ok(row.clone())
    }

    async fn delete_for_owner(&self, email: &str) -> Result<u64, StoreError> {
        self.submissions_guard()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.owner_email != email);
        Ok((before - rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_submissions.load(Ordering::Relaxed) {
            Err(StoreError::QueryError("injected ping failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-memory double for the identity provider collaborator.
pub struct StubIdentity {
    tokens: Mutex<HashMap<String, Principal>>,
    codes: Mutex<HashSet<String>>,
}

impl StubIdentity {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            codes: Mutex::new(HashSet::new()),
        }
    }

    pub fn add_token(&self, token: &str, email: &str) {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            Principal {
                id: Uuid::new_v4().to_string(),
                email: Some(email.to_string()),
            },
        );
    }

    pub fn add_token_without_email(&self, token: &str) {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            Principal {
                id: Uuid::new_v4().to_string(),
                email: None,
            },
        );
    }

    pub fn allow_code(&self, code: &str) {
        self.codes.lock().unwrap().insert(code.to_string());
    }
}

impl Default for StubIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn verify_token(&self, token: &str) -> Result<Principal, ProviderError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("unknown token".to_string()))
    }

    async fn exchange_code(&self, code: &str) -> Result<(), ProviderError> {
        if self.codes.lock().unwrap().contains(code) {
            Ok(())
        } else {
            Err(ProviderError::Rejected("invalid login code".to_string()))
        }
    }
}
