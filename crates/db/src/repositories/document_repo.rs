//! Repository for the `documents` table.

use docroute_core::document::{DocumentPatch, DocumentRecord};
use docroute_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::document::DocumentRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, timestamp, category, confidence, status, \
                       extracted_fields_json, destination, summary, thumbnail, \
                       flagged_for_retraining, origin, user_id";

/// Provides create, list and partial-update operations for documents.
/// There is deliberately no delete.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a fully assembled record. Fails with a unique violation
    /// (`documents_pkey`) if the id already exists.
    pub async fn create(pool: &PgPool, record: &DocumentRecord) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT INTO documents ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        );
        sqlx::query(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(record.timestamp)
            .bind(record.category.as_str())
            .bind(record.confidence)
            .bind(record.status.as_str())
            .bind(Json(&record.extracted_fields))
            .bind(&record.destination)
            .bind(&record.summary)
            .bind(&record.thumbnail)
            .bind(record.flagged_for_retraining)
            .bind(record.origin.as_str())
            .bind(record.user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Find a document by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DocumentRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(DocumentRecord::try_from)
            .transpose()
    }

    /// List every document owned by `user_id`, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DocumentRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE user_id = $1
             ORDER BY timestamp DESC, id DESC"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(DocumentRecord::try_from)
            .collect()
    }

    /// Apply a partial update and return the row as stored afterwards.
    /// `id`, `name`, `timestamp`, `origin` and `user_id` are never touched.
    ///
    /// Required columns use `COALESCE` so an absent field keeps its value.
    /// The nullable `thumbnail` and `flagged_for_retraining` carry an
    /// explicit "present" flag so the patch can also set them to NULL.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &DocumentPatch,
    ) -> Result<Option<DocumentRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                category = COALESCE($2, category),
                confidence = COALESCE($3, confidence),
                status = COALESCE($4, status),
                extracted_fields_json = COALESCE($5, extracted_fields_json),
                destination = COALESCE($6, destination),
                summary = COALESCE($7, summary),
                thumbnail = CASE WHEN $8 THEN $9 ELSE thumbnail END,
                flagged_for_retraining = CASE WHEN $10 THEN $11 ELSE flagged_for_retraining END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .bind(patch.category.map(|c| c.as_str()))
            .bind(patch.confidence)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.extracted_fields.as_ref().map(Json))
            .bind(patch.destination.as_deref())
            .bind(patch.summary.as_deref())
            .bind(patch.thumbnail.is_some())
            .bind(patch.thumbnail.clone().flatten())
            .bind(patch.flagged_for_retraining.is_some())
            .bind(patch.flagged_for_retraining.flatten())
            .fetch_optional(pool)
            .await?
            .map(DocumentRecord::try_from)
            .transpose()
    }
}
