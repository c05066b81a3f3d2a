//! Public catalogue routes.
//!
//! Read-only, localized to the negotiated language.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::content::{LanguageCatalogue, LocalizedView};
use crate::error::AppResult;
use crate::middleware::ResolvedLanguage;
use crate::state::AppState;

use super::{kind_from_path, load_of_kind};

/// Localized listing response.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub language: String,
    pub items: Vec<LocalizedView>,
}

/// Languages response.
#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub default: String,
    pub languages: LanguageCatalogue,
}

/// List the catalogue languages, default first.
async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let catalogue = state.catalogue();
    Json(LanguagesResponse {
        default: catalogue.default_language().to_string(),
        languages: catalogue.clone(),
    })
}

/// List every entity of a kind in the request language.
async fn list(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Path(kind): Path<String>,
) -> AppResult<Json<ListingResponse>> {
    let kind = kind_from_path(&kind)?;
    let service = state.entities();

    let items = service
        .list(kind)
        .await?
        .iter()
        .map(|view| service.localize(view, &language))
        .collect();

    Ok(Json(ListingResponse { language, items }))
}

/// Show one entity in the request language.
async fn show(
    State(state): State<AppState>,
    Extension(ResolvedLanguage(language)): Extension<ResolvedLanguage>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> AppResult<Json<LocalizedView>> {
    let kind = kind_from_path(&kind)?;
    let view = load_of_kind(&state, kind, id).await?;

    Ok(Json(state.entities().localize(&view, &language)))
}

/// Create the public catalogue router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/languages", get(languages))
        .route("/api/{kind}", get(list))
        .route("/api/{kind}/{id}", get(show))
}
