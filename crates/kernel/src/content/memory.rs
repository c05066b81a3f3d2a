//! In-memory entity repository.
//!
//! Same contract as the PostgreSQL repository, backed by maps. Used for
//! tests and for running the API without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::attributes::{EntityKind, SharedAttributes};
use super::repository::{EntityRepository, StoredEntity};
use super::value::TranslationValues;
use crate::models::{EntityRecord, TranslationRecord};

#[derive(Default)]
struct Tables {
    entities: HashMap<Uuid, EntityRecord>,
    /// Keyed by (entity id, language): the pair is unique.
    translations: BTreeMap<(Uuid, String), TranslationRecord>,
}

/// Map-backed repository.
#[derive(Clone, Default)]
pub struct MemoryEntityRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryEntityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of translation rows stored for an entity.
    pub fn translation_count(&self, id: Uuid) -> usize {
        self.tables
            .read()
            .translations
            .keys()
            .filter(|(entity_id, _)| *entity_id == id)
            .count()
    }

    /// Raw translation row, bypassing the merger.
    pub fn translation(&self, id: Uuid, language: &str) -> Option<TranslationRecord> {
        self.tables
            .read()
            .translations
            .get(&(id, language.to_string()))
            .cloned()
    }

    /// Insert a raw root row, bypassing the shared attribute types.
    pub fn insert_raw_root(&self, kind: &str, shared: serde_json::Value) -> Uuid {
        let id = Uuid::now_v7();
        let now = chrono::Utc::now().timestamp();
        self.tables.write().entities.insert(
            id,
            EntityRecord {
                id,
                kind: kind.to_string(),
                shared,
                created: now,
                changed: now,
            },
        );
        id
    }

    /// Insert a raw translation row, bypassing validation and the catalogue.
    pub fn insert_raw_translation(&self, id: Uuid, language: &str, fields: serde_json::Value) {
        let now = chrono::Utc::now().timestamp();
        self.tables.write().translations.insert(
            (id, language.to_string()),
            TranslationRecord {
                entity_id: id,
                language: language.to_string(),
                fields,
                created: now,
                changed: now,
            },
        );
    }

    fn stored(tables: &Tables, root: &EntityRecord) -> StoredEntity {
        let translations = tables
            .translations
            .range((root.id, String::new())..)
            .take_while(|((entity_id, _), _)| *entity_id == root.id)
            .map(|(_, row)| row.clone())
            .collect();

        StoredEntity {
            root: root.clone(),
            translations,
        }
    }
}

#[async_trait]
impl EntityRepository for MemoryEntityRepository {
    async fn load_entity(&self, id: Uuid) -> Result<Option<StoredEntity>> {
        let tables = self.tables.read();
        Ok(tables
            .entities
            .get(&id)
            .map(|root| Self::stored(&tables, root)))
    }

    async fn load_all_entities(&self, kind: EntityKind) -> Result<Vec<StoredEntity>> {
        let tables = self.tables.read();
        let mut roots: Vec<&EntityRecord> = tables
            .entities
            .values()
            .filter(|root| root.kind == kind.as_str())
            .collect();
        roots.sort_by_key(|root| (root.created, root.id));

        Ok(roots
            .into_iter()
            .map(|root| Self::stored(&tables, root))
            .collect())
    }

    async fn save_root(&self, id: Option<Uuid>, shared: &SharedAttributes) -> Result<Uuid> {
        let now = chrono::Utc::now().timestamp();
        let json = serde_json::to_value(shared).context("failed to encode shared attributes")?;
        let mut tables = self.tables.write();

        match id {
            None => {
                let id = Uuid::now_v7();
                tables.entities.insert(
                    id,
                    EntityRecord {
                        id,
                        kind: shared.kind().as_str().to_string(),
                        shared: json,
                        created: now,
                        changed: now,
                    },
                );
                Ok(id)
            }
            Some(id) => {
                let Some(root) = tables
                    .entities
                    .get_mut(&id)
                    .filter(|root| root.kind == shared.kind().as_str())
                else {
                    anyhow::bail!("entity {id} does not exist");
                };
                root.shared = json;
                root.changed = now;
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
        let now = chrono::Utc::now().timestamp();
        let json = serde_json::to_value(fields).context("failed to encode translation")?;
        let mut tables = self.tables.write();

        if !tables.entities.contains_key(&id) {
            anyhow::bail!("entity {id} does not exist");
        }

        tables
            .translations
            .entry((id, language.to_string()))
            .and_modify(|row| {
                row.fields = json.clone();
                row.changed = now;
            })
            .or_insert_with(|| TranslationRecord {
                entity_id: id,
                language: language.to_string(),
                fields: json.clone(),
                created: now,
                changed: now,
            });

        Ok(())
    }

    async fn delete_entity(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write();
        tables.translations.retain(|(entity_id, _), _| *entity_id != id);
        Ok(tables.entities.remove(&id).is_some())
    }

    async fn health(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for MemoryEntityRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("MemoryEntityRepository")
            .field("entities", &tables.entities.len())
            .field("translations", &tables.translations.len())
            .finish()
    }
}
