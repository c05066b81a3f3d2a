//! Entity translation model.
//!
//! One row per (entity, language) pair. The pair is the primary key, so an
//! upsert either updates the existing row in place or inserts a new one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::content::TranslationValues;

/// Translation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TranslationRecord {
    pub entity_id: Uuid,

    /// Language code as stored (catalogue spelling, e.g. "pt-BR").
    pub language: String,

    /// Translatable attribute values keyed by attribute name. Rows may carry
    /// only some attributes.
    pub fields: serde_json::Value,

    pub created: i64,
    pub changed: i64,
}

impl TranslationRecord {
    /// List all translations for an entity.
    pub async fn list_for_entity(pool: &PgPool, entity_id: Uuid) -> Result<Vec<Self>> {
        let translations = sqlx::query_as::<_, TranslationRecord>(
            r#"
            SELECT entity_id, language, fields, created, changed
            FROM entity_translation
            WHERE entity_id = $1
            ORDER BY language
            "#,
        )
        .bind(entity_id)
        .fetch_all(pool)
        .await
        .context("failed to list entity translations")?;

        Ok(translations)
    }

    /// List translations for several entities in one query.
    pub async fn list_for_entities(pool: &PgPool, entity_ids: &[Uuid]) -> Result<Vec<Self>> {
        if entity_ids.is_empty() {
            return Ok(Vec::new());
        }

        let translations = sqlx::query_as::<_, TranslationRecord>(
            r#"
            SELECT entity_id, language, fields, created, changed
            FROM entity_translation
            WHERE entity_id = ANY($1)
            ORDER BY entity_id, language
            "#,
        )
        .bind(entity_ids)
        .fetch_all(pool)
        .await
        .context("failed to list translations for entities")?;

        Ok(translations)
    }

    /// Insert or update the translation for one language.
    pub async fn upsert(
        pool: &PgPool,
        entity_id: Uuid,
        language: &str,
        fields: &TranslationValues,
    ) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let translation = sqlx::query_as::<_, TranslationRecord>(
            r#"
            INSERT INTO entity_translation (entity_id, language, fields, created, changed)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (entity_id, language) DO UPDATE SET
                fields = EXCLUDED.fields,
                changed = EXCLUDED.changed
            RETURNING entity_id, language, fields, created, changed
            "#,
        )
        .bind(entity_id)
        .bind(language)
        .bind(Json(fields))
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to upsert entity translation")?;

        Ok(translation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_rows_deserialize() {
        let record: TranslationRecord = serde_json::from_value(serde_json::json!({
            "entity_id": Uuid::nil(),
            "language": "de",
            "fields": {"description": "Tolles Casino"},
            "created": 0,
            "changed": 0
        }))
        .unwrap();

        assert_eq!(record.language, "de");
        assert_eq!(record.fields["description"], "Tolles Casino");
        assert!(record.fields.get("review").is_none());
    }
}
