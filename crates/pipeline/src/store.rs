//! Persistence boundary for document records.
//!
//! Nothing outside a [`DocumentStore`] implementation writes document state.
//! Records are created once, then only changed through partial updates; there
//! is no delete.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use docroute_core::document::{DocumentPatch, DocumentRecord};
use docroute_core::types::DbId;
use docroute_db::repositories::DocumentRepo;
use docroute_db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document {0} already exists")]
    Duplicate(DbId),

    #[error("Document {0} not found")]
    NotFound(DbId),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other backend failure.
    #[error("Document store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Map a sqlx error raised while writing or reading `id`.
    fn from_sqlx(err: sqlx::Error, id: Option<DbId>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                match id {
                    Some(id) => StoreError::Duplicate(id),
                    None => StoreError::Backend(err.to_string()),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id
    /// is taken.
    async fn create(&self, record: &DocumentRecord) -> Result<(), StoreError>;

    /// Every record owned by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: DbId) -> Result<Vec<DocumentRecord>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<DocumentRecord>, StoreError>;

    /// Overlay `patch` onto the stored record and return the record as the
    /// store now holds it. Fields the patch does not name keep their values.
    /// Empty patches are rejected with [`StoreError::Validation`], unknown
    /// ids with [`StoreError::NotFound`].
    async fn update(&self, id: DbId, patch: &DocumentPatch)
        -> Result<DocumentRecord, StoreError>;
}

fn check_patch(patch: &DocumentPatch) -> Result<(), StoreError> {
    patch
        .validate()
        .map_err(|e| StoreError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`DocumentStore`] over the `documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        record
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        DocumentRepo::create(&self.pool, record)
            .await
            .map_err(|e| StoreError::from_sqlx(e, Some(record.id)))
    }

    async fn list_by_owner(&self, user_id: DbId) -> Result<Vec<DocumentRecord>, StoreError> {
        DocumentRepo::list_by_owner(&self.pool, user_id)
            .await
            .map_err(|e| StoreError::from_sqlx(e, None))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<DocumentRecord>, StoreError> {
        DocumentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx(e, None))
    }

    async fn update(
        &self,
        id: DbId,
        patch: &DocumentPatch,
    ) -> Result<DocumentRecord, StoreError> {
        check_patch(patch)?;
        DocumentRepo::update(&self.pool, id, patch)
            .await
            .map_err(|e| StoreError::from_sqlx(e, None))?
            .ok_or(StoreError::NotFound(id))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// [`DocumentStore`] held in a map. Used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    records: Mutex<HashMap<DbId, DocumentRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        record
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn list_by_owner(&self, user_id: DbId) -> Result<Vec<DocumentRecord>, StoreError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<DocumentRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<DocumentRecord>, StoreError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&id).cloned())
    }

    async fn update(
        &self,
        id: DbId,
        patch: &DocumentPatch,
    ) -> Result<DocumentRecord, StoreError> {
        check_patch(patch)?;
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply_to(record);
        Ok(record.clone())
    }
}
