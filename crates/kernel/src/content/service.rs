//! Entity service.
//!
//! Loads rows and merges them into views, and turns edited views back into
//! writes: validate, save the root, then upsert every language concurrently.
//! Root creation always completes before any translation write is issued,
//! because the translation rows need the new ID.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::attributes::EntityKind;
use super::error::{ContentError, FieldError, LanguageFailure, StoreOperation};
use super::fields::FieldRegistry;
use super::language::LanguageCatalogue;
use super::merge::ViewMerger;
use super::repository::EntityRepository;
use super::split::{EditSplitter, SplitPlan};
use super::validation::validate_view;
use super::view::{LocalizedView, MergedView};

/// Default per-call store timeout.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for saving an edited view.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SaveOptions {
    /// Skip languages whose payload matches what is already stored.
    #[serde(default)]
    pub skip_unchanged: bool,
}

/// Entity service.
#[derive(Clone)]
pub struct EntityService {
    repository: Arc<dyn EntityRepository>,
    catalogue: Arc<LanguageCatalogue>,
    registry: Arc<FieldRegistry>,
    merger: ViewMerger,
    splitter: EditSplitter,
    store_timeout: Duration,
}

impl EntityService {
    /// Create a new entity service.
    pub fn new(
        repository: Arc<dyn EntityRepository>,
        catalogue: LanguageCatalogue,
        registry: FieldRegistry,
        store_timeout: Duration,
    ) -> Self {
        let catalogue = Arc::new(catalogue);
        let registry = Arc::new(registry);

        Self {
            repository,
            merger: ViewMerger::new(catalogue.clone(), registry.clone()),
            splitter: EditSplitter::new(catalogue.clone(), registry.clone()),
            catalogue,
            registry,
            store_timeout,
        }
    }

    pub fn catalogue(&self) -> &LanguageCatalogue {
        &self.catalogue
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Store reachability, for the health check.
    pub async fn store_healthy(&self) -> bool {
        self.repository.health().await
    }

    /// Run one repository call with the store timeout, tagging failures with
    /// the operation and entity.
    async fn store<T>(
        &self,
        operation: StoreOperation,
        entity_id: Option<Uuid>,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, ContentError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                error!(%operation, entity_id = ?entity_id, error = %format!("{source:#}"), "store call failed");
                Err(ContentError::Store {
                    operation,
                    entity_id,
                    source,
                })
            }
            Err(_) => {
                warn!(%operation, entity_id = ?entity_id, timeout = ?self.store_timeout, "store call timed out");
                Err(ContentError::Timeout {
                    operation,
                    entity_id,
                })
            }
        }
    }

    /// Load one entity as a merged view.
    pub async fn load(&self, id: Uuid) -> Result<MergedView, ContentError> {
        let stored = self
            .store(StoreOperation::LoadEntity, Some(id), self.repository.load_entity(id))
            .await?
            .ok_or(ContentError::NotFound { id })?;

        self.merger.merge(&stored.root, &stored.translations)
    }

    /// The kind column of a stored root, without merging its attributes.
    ///
    /// Works on roots whose shared attributes no longer decode.
    pub async fn kind_of(&self, id: Uuid) -> Result<EntityKind, ContentError> {
        let stored = self
            .store(StoreOperation::LoadEntity, Some(id), self.repository.load_entity(id))
            .await?
            .ok_or(ContentError::NotFound { id })?;

        stored
            .root
            .kind
            .parse::<EntityKind>()
            .map_err(|e| ContentError::Corrupt {
                id,
                reason: e.to_string(),
            })
    }

    /// Load every entity of a kind for catalogue listing.
    ///
    /// Casinos are ordered by rating (highest first), slots by name.
    /// Unreadable rows are skipped with a warning so one bad record does not
    /// take the catalogue down.
    pub async fn list(&self, kind: EntityKind) -> Result<Vec<MergedView>, ContentError> {
        let stored = self
            .store(
                StoreOperation::LoadAllEntities,
                None,
                self.repository.load_all_entities(kind),
            )
            .await?;

        let mut views: Vec<MergedView> = stored
            .iter()
            .filter_map(|entity| match self.merger.merge(&entity.root, &entity.translations) {
                Ok(view) => Some(view),
                Err(e) => {
                    warn!(entity_id = %entity.root.id, error = %e, "skipping unreadable entity");
                    None
                }
            })
            .collect();

        views.sort_by(catalogue_order);
        debug!(kind = %kind, count = views.len(), "listed entities");

        Ok(views)
    }

    /// An unsaved view for the creation form.
    pub fn blank(&self, kind: EntityKind) -> MergedView {
        self.merger.blank(kind)
    }

    /// Slice a view to one language for public display.
    pub fn localize(&self, view: &MergedView, language: &str) -> LocalizedView {
        view.localize(language, &self.catalogue)
    }

    fn validate(&self, view: &MergedView) -> Result<(), ContentError> {
        validate_view(view, &self.catalogue, &self.registry).map_err(ContentError::Validation)
    }

    /// Create a new entity from a view.
    pub async fn create(&self, mut view: MergedView) -> Result<MergedView, ContentError> {
        if view.id.is_some() {
            return Err(ContentError::Validation(vec![FieldError::shared(
                "id",
                "is assigned by the store on creation",
            )]));
        }
        self.validate(&view)?;

        // Nothing is stored yet, whatever the client claims.
        view.stored_languages.clear();
        let plan = self.splitter.split(&view);

        let id = self
            .store(
                StoreOperation::SaveRoot,
                None,
                self.repository.save_root(None, &plan.shared),
            )
            .await?;

        info!(entity_id = %id, kind = %view.kind(), languages = plan.translations.len(), "entity created");

        self.write_translations(id, &plan).await?;
        self.load(id).await
    }

    /// Save an edited view over an existing entity.
    pub async fn update(
        &self,
        id: Uuid,
        mut view: MergedView,
        options: SaveOptions,
    ) -> Result<MergedView, ContentError> {
        if view.id.is_some_and(|view_id| view_id != id) {
            return Err(ContentError::Validation(vec![FieldError::shared(
                "id",
                "cannot be changed",
            )]));
        }
        self.validate(&view)?;

        let current = self.load(id).await?;
        if current.kind() != view.kind() {
            return Err(ContentError::KindMismatch {
                id,
                expected: current.kind(),
                actual: view.kind(),
            });
        }

        // Row presence comes from the store, not from the submitted view.
        // Values the edit leaves out keep their stored content.
        view.stored_languages = current.stored_languages.clone();
        view.fill_missing_from(&current);
        let mut plan = self.splitter.split(&view);
        if options.skip_unchanged {
            plan.retain_changed(&current, &self.splitter);
        }

        self.store(
            StoreOperation::SaveRoot,
            Some(id),
            self.repository.save_root(Some(id), &plan.shared),
        )
        .await?;

        info!(entity_id = %id, languages = plan.translations.len(), "entity updated");

        self.write_translations(id, &plan).await?;
        self.load(id).await
    }

    /// Upsert every planned language concurrently.
    ///
    /// A failing language does not stop the others; all failures are
    /// reported together as a partial write.
    async fn write_translations(&self, id: Uuid, plan: &SplitPlan) -> Result<(), ContentError> {
        let writes = plan.translations.iter().map(|payload| async move {
            let result = self
                .store(
                    StoreOperation::UpsertTranslation,
                    Some(id),
                    self.repository
                        .upsert_translation(id, &payload.language, &payload.fields),
                )
                .await;
            (payload.language.as_str(), result)
        });

        let failures: Vec<LanguageFailure> = join_all(writes)
            .await
            .into_iter()
            .filter_map(|(language, result)| {
                let error = result.err()?;
                let reason = match &error {
                    ContentError::Store { source, .. } => format!("{source:#}"),
                    other => other.to_string(),
                };
                Some(LanguageFailure {
                    language: language.to_string(),
                    retryable: error.is_retryable(),
                    reason,
                })
            })
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        warn!(
            entity_id = %id,
            failed = ?failures.iter().map(|f| f.language.as_str()).collect::<Vec<_>>(),
            "translation writes failed"
        );
        Err(ContentError::PartialWrite {
            entity_id: id,
            failures,
        })
    }

    /// Delete an entity and all of its translations.
    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        let deleted = self
            .store(
                StoreOperation::DeleteEntity,
                Some(id),
                self.repository.delete_entity(id),
            )
            .await?;

        if !deleted {
            return Err(ContentError::NotFound { id });
        }

        info!(entity_id = %id, "entity deleted");
        Ok(())
    }
}

/// Highest rating first, then name.
fn catalogue_order(a: &MergedView, b: &MergedView) -> Ordering {
    let rating_a = a.shared.rating().unwrap_or_default();
    let rating_b = b.shared.rating().unwrap_or_default();
    rating_b
        .total_cmp(&rating_a)
        .then_with(|| a.shared.name().cmp(b.shared.name()))
}

impl std::fmt::Debug for EntityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("languages", &self.catalogue.len())
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::{CasinoAttributes, MemoryEntityRepository, SharedAttributes};

    fn service() -> EntityService {
        EntityService::new(
            Arc::new(MemoryEntityRepository::new()),
            LanguageCatalogue::default(),
            FieldRegistry::standard().unwrap(),
            DEFAULT_STORE_TIMEOUT,
        )
    }

    fn casino(service: &EntityService, name: &str, slug: &str, rating: f64) -> MergedView {
        let mut view = service.blank(EntityKind::Casino);
        view.shared = SharedAttributes::Casino(CasinoAttributes {
            name: name.to_string(),
            slug: slug.to_string(),
            rating,
            ..Default::default()
        });
        view
    }

    #[tokio::test]
    async fn create_then_load() {
        let service = service();
        let mut view = casino(&service, "Lucky Star", "lucky-star", 4.5);
        view.set_translation("description", "en", "Great casino");

        let created = service.create(view).await.unwrap();
        let id = created.id.unwrap();

        let loaded = service.load(id).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.stored_languages.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_preassigned_id() {
        let service = service();
        let mut view = casino(&service, "Lucky Star", "lucky-star", 4.5);
        view.id = Some(Uuid::now_v7());

        let err = service.create(view).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(ref errors) if errors[0].field == "id"));
    }

    #[tokio::test]
    async fn update_rejects_kind_change() {
        let service = service();
        let created = service
            .create(casino(&service, "Lucky Star", "lucky-star", 4.5))
            .await
            .unwrap();
        let id = created.id.unwrap();

        let mut slot = service.blank(EntityKind::Slot);
        if let SharedAttributes::Slot(attrs) = &mut slot.shared {
            attrs.name = "Reels".to_string();
            attrs.slug = "reels".to_string();
            attrs.provider = "Spinworks".to_string();
            attrs.reels = 5;
        }

        let err = service.update(id, slot, SaveOptions::default()).await.unwrap_err();
        assert!(matches!(err, ContentError::KindMismatch { .. }));
    }

    #[tokio::test]
    async fn list_orders_by_rating() {
        let service = service();
        for (name, slug, rating) in [("Alpha", "alpha", 3.0), ("Beta", "beta", 4.8), ("Gamma", "gamma", 4.8)] {
            service.create(casino(&service, name, slug, rating)).await.unwrap();
        }

        let names: Vec<String> = service
            .list(EntityKind::Casino)
            .await
            .unwrap()
            .iter()
            .map(|v| v.shared.name().to_string())
            .collect();
        assert_eq!(names, vec!["Beta", "Gamma", "Alpha"]);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let service = service();
        let err = service.delete(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }
}
