//! Admin JSON routes for editing entities.
//!
//! Admins work on merged views: all languages of an entity side by side.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::content::{EntityKind, MergedView, SaveOptions};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::{ensure_kind, kind_from_path, load_of_kind};

/// Reject a body whose kind disagrees with the path.
fn check_body_kind(kind: EntityKind, view: &MergedView) -> AppResult<()> {
    if view.kind() != kind {
        return Err(AppError::BadRequest(format!(
            "body is a {}, path expects a {kind}",
            view.kind()
        )));
    }
    Ok(())
}

/// List merged views of a kind.
async fn list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<Vec<MergedView>>> {
    let kind = kind_from_path(&kind)?;
    Ok(Json(state.entities().list(kind).await?))
}

/// Blank view for the creation form.
async fn blank(State(state): State<AppState>, Path(kind): Path<String>) -> AppResult<Json<MergedView>> {
    let kind = kind_from_path(&kind)?;
    Ok(Json(state.entities().blank(kind)))
}

/// Load one merged view.
async fn show(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<MergedView>> {
    let kind = kind_from_path(&kind)?;
    Ok(Json(load_of_kind(&state, kind, id).await?))
}

/// Create an entity.
async fn create(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(view): Json<MergedView>,
) -> AppResult<(StatusCode, Json<MergedView>)> {
    let kind = kind_from_path(&kind)?;
    check_body_kind(kind, &view)?;

    let created = state.entities().create(view).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Save an edited view.
async fn update(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Query(options): Query<SaveOptions>,
    Json(view): Json<MergedView>,
) -> AppResult<Json<MergedView>> {
    let kind = kind_from_path(&kind)?;
    check_body_kind(kind, &view)?;

    Ok(Json(state.entities().update(id, view, options).await?))
}

/// Delete an entity and its translations.
async fn delete(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    let kind = kind_from_path(&kind)?;
    ensure_kind(&state, kind, id).await?;

    state.entities().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/{kind}", get(list).post(create))
        .route("/api/admin/{kind}/new", get(blank))
        .route("/api/admin/{kind}/{id}", get(show).put(update).delete(delete))
}
