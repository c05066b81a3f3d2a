//! HTTP route handlers.

pub mod admin;
pub mod catalogue;
pub mod health;

use axum::Router;
use uuid::Uuid;

use crate::content::{EntityKind, MergedView};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Build the application router with language negotiation applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(catalogue::router())
        .merge(admin::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::resolve_language,
        ))
        .with_state(state)
}

/// Parse the `{kind}` path segment; unknown kinds are not found.
fn kind_from_path(kind: &str) -> AppResult<EntityKind> {
    kind.parse().map_err(|_| AppError::NotFound)
}

/// Load an entity addressed as `/{kind}/{id}`; one of another kind is not found.
async fn load_of_kind(state: &AppState, kind: EntityKind, id: Uuid) -> AppResult<MergedView> {
    let view = state.entities().load(id).await?;
    if view.kind() != kind {
        return Err(AppError::NotFound);
    }
    Ok(view)
}

/// Like [`load_of_kind`], but reads only the root's kind column.
async fn ensure_kind(state: &AppState, kind: EntityKind, id: Uuid) -> AppResult<()> {
    if state.entities().kind_of(id).await? != kind {
        return Err(AppError::NotFound);
    }
    Ok(())
}
