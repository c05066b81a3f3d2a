//! Entity repository.
//!
//! The repository is the only gateway to the store. It deals in raw rows;
//! merging into views happens above it.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::attributes::{EntityKind, SharedAttributes};
use super::value::TranslationValues;
use crate::db;
use crate::models::{EntityRecord, TranslationRecord};

/// A root row with its translation rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntity {
    pub root: EntityRecord,
    /// Ordered by language code.
    pub translations: Vec<TranslationRecord>,
}

/// Data access for entities and their translations.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Load one entity. `None` when no root row matches.
    async fn load_entity(&self, id: Uuid) -> Result<Option<StoredEntity>>;

    /// Load every entity of a kind.
    async fn load_all_entities(&self, kind: EntityKind) -> Result<Vec<StoredEntity>>;

    /// Create (`id == None`) or update a root row, returning its ID.
    ///
    /// Updating a missing row is an error.
    async fn save_root(&self, id: Option<Uuid>, shared: &SharedAttributes) -> Result<Uuid>;

    /// Insert or update the translation row for (id, language).
    async fn upsert_translation(
        &self,
        id: Uuid,
        language: &str,
        fields: &TranslationValues,
    ) -> Result<()>;

    /// Delete translations, then the root. `false` when no root existed.
    async fn delete_entity(&self, id: Uuid) -> Result<bool>;

    /// Check that the store is reachable.
    async fn health(&self) -> bool;
}

/// PostgreSQL-backed repository.
#[derive(Clone)]
pub struct PgEntityRepository {
    pool: PgPool,
}

impl PgEntityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository for PgEntityRepository {
    async fn load_entity(&self, id: Uuid) -> Result<Option<StoredEntity>> {
        let Some(root) = EntityRecord::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let translations = TranslationRecord::list_for_entity(&self.pool, id).await?;

        Ok(Some(StoredEntity { root, translations }))
    }

    async fn load_all_entities(&self, kind: EntityKind) -> Result<Vec<StoredEntity>> {
        let roots = EntityRecord::list_by_kind(&self.pool, kind).await?;
        let ids: Vec<Uuid> = roots.iter().map(|r| r.id).collect();
        let translations = TranslationRecord::list_for_entities(&self.pool, &ids).await?;

        debug!(kind = %kind, entities = roots.len(), translations = translations.len(), "loaded entities");

        let mut by_entity: HashMap<Uuid, Vec<TranslationRecord>> = HashMap::new();
        for translation in translations {
            by_entity
                .entry(translation.entity_id)
                .or_default()
                .push(translation);
        }

        Ok(roots
            .into_iter()
            .map(|root| {
                let translations = by_entity.remove(&root.id).unwrap_or_default();
                StoredEntity { root, translations }
            })
            .collect())
    }

    async fn save_root(&self, id: Option<Uuid>, shared: &SharedAttributes) -> Result<Uuid> {
        match id {
            None => EntityRecord::insert(&self.pool, shared).await,
            Some(id) => {
                let updated = EntityRecord::update_shared(&self.pool, id, shared)
                    .await
                    .with_context(|| format!("failed to save entity {id}"))?;
                if !updated {
                    anyhow::bail!("entity {id} does not exist");
                }
                Ok(id)
            }
        }
    }

    async fn upsert_translation(
        &self,
        id: Uuid,
        language: &str,
        fields: &TranslationValues,
    ) -> Result<()> {
        TranslationRecord::upsert(&self.pool, id, language, fields).await?;
        Ok(())
    }

    async fn delete_entity(&self, id: Uuid) -> Result<bool> {
        EntityRecord::delete(&self.pool, id).await
    }

    async fn health(&self) -> bool {
        db::check_health(&self.pool).await
    }
}

impl std::fmt::Debug for PgEntityRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgEntityRepository").finish()
    }
}
