//! Document row model.
//!
//! Labels are stored as their display strings and parsed back into the core
//! enums when a row is converted into a [`DocumentRecord`].

use docroute_core::document::{DocumentRecord, ExtractedField};
use docroute_core::types::{DbId, EpochMillis};
use sqlx::types::Json;
use sqlx::FromRow;

/// Raw row from the `documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: DbId,
    pub name: String,
    pub timestamp: EpochMillis,
    pub category: String,
    pub confidence: f64,
    pub status: String,
    pub extracted_fields_json: Json<Vec<ExtractedField>>,
    pub destination: String,
    pub summary: String,
    pub thumbnail: Option<String>,
    pub flagged_for_retraining: Option<bool>,
    pub origin: String,
    pub user_id: DbId,
}

impl TryFrom<DocumentRow> for DocumentRecord {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(DocumentRecord {
            id: row.id,
            name: row.name,
            timestamp: row.timestamp,
            category: row.category.parse().map_err(decode_err)?,
            confidence: row.confidence,
            status: row.status.parse().map_err(decode_err)?,
            extracted_fields: row.extracted_fields_json.0,
            destination: row.destination,
            summary: row.summary,
            thumbnail: row.thumbnail,
            flagged_for_retraining: row.flagged_for_retraining,
            origin: row.origin.parse().map_err(decode_err)?,
            user_id: row.user_id,
        })
    }
}

fn decode_err(e: docroute_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}
