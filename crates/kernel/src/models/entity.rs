//! Entity model and CRUD operations.
//!
//! An entity is the root content record (a casino or a slot game). Shared
//! attributes are stored as JSONB on the root row; per-language values live
//! in `entity_translation`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::content::{EntityKind, SharedAttributes};

/// Root entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EntityRecord {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Entity kind machine name ("casino", "slot").
    pub kind: String,

    /// Shared attributes, tagged with the kind.
    pub shared: serde_json::Value,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

impl EntityRecord {
    /// Find an entity by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let entity = sqlx::query_as::<_, EntityRecord>(
            "SELECT id, kind, shared, created, changed FROM entity WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch entity by id")?;

        Ok(entity)
    }

    /// List entities of a kind, oldest first.
    pub async fn list_by_kind(pool: &PgPool, kind: EntityKind) -> Result<Vec<Self>> {
        let entities = sqlx::query_as::<_, EntityRecord>(
            "SELECT id, kind, shared, created, changed FROM entity WHERE kind = $1 ORDER BY created, id",
        )
        .bind(kind.as_str())
        .fetch_all(pool)
        .await
        .context("failed to list entities by kind")?;

        Ok(entities)
    }

    /// Insert a new root row and return its ID.
    pub async fn insert(pool: &PgPool, shared: &SharedAttributes) -> Result<Uuid> {
        let now = chrono::Utc::now().timestamp();
        let id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO entity (id, kind, shared, created, changed)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(id)
        .bind(shared.kind().as_str())
        .bind(Json(shared))
        .bind(now)
        .execute(pool)
        .await
        .context("failed to insert entity")?;

        Ok(id)
    }

    /// Replace the shared attributes of an existing root row.
    ///
    /// Returns `false` when no row matched. The kind is immutable, so the
    /// update only matches rows of the same kind.
    pub async fn update_shared(pool: &PgPool, id: Uuid, shared: &SharedAttributes) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE entity SET
                shared = $1,
                changed = $2
            WHERE id = $3 AND kind = $4
            "#,
        )
        .bind(Json(shared))
        .bind(now)
        .bind(id)
        .bind(shared.kind().as_str())
        .execute(pool)
        .await
        .context("failed to update entity")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an entity and all of its translations.
    ///
    /// Children are removed first inside one transaction, so a failure on the
    /// root delete rolls back the translation delete as well.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let mut tx = pool.begin().await.context("failed to start transaction")?;

        sqlx::query("DELETE FROM entity_translation WHERE entity_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to delete entity translations")?;

        let result = sqlx::query("DELETE FROM entity WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to delete entity")?;

        tx.commit().await.context("failed to commit transaction")?;

        Ok(result.rows_affected() > 0)
    }
}
