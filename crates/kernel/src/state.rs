//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::content::{
    EntityRepository, EntityService, FieldRegistry, LanguageCatalogue, PgEntityRepository,
};
use crate::db;
use crate::middleware::language::{
    AcceptLanguageNegotiator, LanguageNegotiator, QueryParamNegotiator,
};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Entity service over the configured repository.
    entities: EntityService,

    /// Language negotiator chain (sorted by priority descending).
    ///
    /// Frozen at startup: changing the catalogue requires a restart.
    language_negotiators: Vec<Arc<dyn LanguageNegotiator>>,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations, and build the services.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;
        db::run_migrations(&pool).await?;
        info!("database migrations applied");

        let repository: Arc<dyn EntityRepository> = Arc::new(PgEntityRepository::new(pool));
        Self::from_repository(repository, config.languages.clone(), config.store_timeout)
    }

    /// Build state over an existing repository.
    pub fn from_repository(
        repository: Arc<dyn EntityRepository>,
        languages: LanguageCatalogue,
        store_timeout: std::time::Duration,
    ) -> Result<Self> {
        let registry = FieldRegistry::standard().context("failed to build field registry")?;

        let mut language_negotiators: Vec<Arc<dyn LanguageNegotiator>> = vec![
            Arc::new(QueryParamNegotiator::new(languages.clone())),
            Arc::new(AcceptLanguageNegotiator::new(languages.clone())),
        ];
        language_negotiators.sort_by_key(|n| std::cmp::Reverse(n.priority()));

        info!(
            languages = languages.len(),
            default_language = languages.default_language(),
            "language catalogue loaded"
        );

        let entities = EntityService::new(repository, languages, registry, store_timeout);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                entities,
                language_negotiators,
            }),
        })
    }

    /// Get the entity service.
    pub fn entities(&self) -> &EntityService {
        &self.inner.entities
    }

    /// Get the language catalogue.
    pub fn catalogue(&self) -> &LanguageCatalogue {
        self.inner.entities.catalogue()
    }

    /// Get the language negotiator chain.
    pub fn language_negotiators(&self) -> &[Arc<dyn LanguageNegotiator>] {
        &self.inner.language_negotiators
    }

    /// Check if the content store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.entities.store_healthy().await
    }
}
