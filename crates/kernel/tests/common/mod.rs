#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`ScriptedRepository`] wraps the in-memory repository, records every
//! write in call order, and can be told to fail or stall individual
//! languages. [`TestApp`] drives the real router with `oneshot`.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use croupier_kernel::content::{
    DEFAULT_STORE_TIMEOUT, EntityKind, EntityRepository, EntityService, FieldRegistry,
    LanguageCatalogue, MemoryEntityRepository, SharedAttributes, StoredEntity, TranslationValues,
};
use croupier_kernel::routes;
use croupier_kernel::state::AppState;

/// A write seen by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Root save, with the ID it returned.
    SaveRoot(Uuid),
    Upsert { id: Uuid, language: String },
}

/// Repository that records writes and fails on demand.
#[derive(Default)]
pub struct ScriptedRepository {
    pub inner: MemoryEntityRepository,
    calls: Mutex<Vec<Call>>,
    failing_languages: Mutex<HashSet<String>>,
    stalled_languages: Mutex<HashSet<String>>,
    fail_root: Mutex<bool>,
}

impl ScriptedRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make upserts for a language fail.
    pub fn fail_language(&self, language: &str) {
        self.failing_languages.lock().insert(language.to_string());
    }

    /// Make upserts for a language hang until the store timeout fires.
    pub fn stall_language(&self, language: &str) {
        self.stalled_languages.lock().insert(language.to_string());
    }

    /// Make root saves fail.
    pub fn fail_root(&self) {
        *self.fail_root.lock() = true;
    }

    /// Clear all scripted failures.
    pub fn heal(&self) {
        self.failing_languages.lock().clear();
        self.stalled_languages.lock().clear();
        *self.fail_root.lock() = false;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Languages upserted since the last clear, sorted.
    pub fn upserted_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upsert { language, .. } => Some(language),
                Call::SaveRoot(_) => None,
            })
            .collect();
        languages.sort();
        languages
    }
}

#[async_trait]
impl EntityRepository for ScriptedRepository {
    async fn load_entity(&self, id: Uuid) -> Result<Option<StoredEntity>> {
        self.inner.load_entity(id).await
    }

    async fn load_all_entities(&self, kind: EntityKind) -> Result<Vec<StoredEntity>> {
        self.inner.load_all_entities(kind).await
    }

    async fn save_root(&self, id: Option<Uuid>, shared: &SharedAttributes) -> Result<Uuid> {
        let fail_root = *self.fail_root.lock();
        if fail_root {
            anyhow::bail!("connection refused");
        }
        let id = self.inner.save_root(id, shared).await?;
        self.calls.lock().push(Call::SaveRoot(id));
        Ok(id)
    }

    async fn upsert_translation(
        &self,
        id: Uuid,
        language: &str,
        fields: &TranslationValues,
    ) -> Result<()> {
        self.calls.lock().push(Call::Upsert {
            id,
            language: language.to_string(),
        });

        let stalled = self.stalled_languages.lock().contains(language);
        let failing = self.failing_languages.lock().contains(language);

        if stalled {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if failing {
            anyhow::bail!("connection reset while writing {language}");
        }
        self.inner.upsert_translation(id, language, fields).await
    }

    async fn delete_entity(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_entity(id).await
    }

    async fn health(&self) -> bool {
        !*self.fail_root.lock()
    }
}

/// Build a service over a scripted repository with the default catalogue.
pub fn service(repository: Arc<ScriptedRepository>) -> EntityService {
    service_with_timeout(repository, DEFAULT_STORE_TIMEOUT)
}

pub fn service_with_timeout(repository: Arc<ScriptedRepository>, timeout: Duration) -> EntityService {
    EntityService::new(
        repository,
        LanguageCatalogue::default(),
        FieldRegistry::standard().expect("standard registry"),
        timeout,
    )
}

/// Test application wrapper using the real routes and state.
pub struct TestApp {
    router: Router,
    pub repository: Arc<ScriptedRepository>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let repository = ScriptedRepository::new();
        let state = AppState::from_repository(
            repository.clone(),
            LanguageCatalogue::default(),
            Duration::from_millis(200),
        )
        .expect("Failed to build AppState");

        Self {
            router: routes::app(state.clone()),
            repository,
            state,
        }
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> Response {
        self.request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Request::delete(uri).body(Body::empty()).unwrap()).await
    }
}

/// Read a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
