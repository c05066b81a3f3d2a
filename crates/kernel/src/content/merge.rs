//! View merger: root row + translation rows → [`MergedView`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::attributes::{EntityKind, SharedAttributes};
use super::error::ContentError;
use super::fields::FieldRegistry;
use super::language::LanguageCatalogue;
use super::value::{FieldValue, TranslatedFields, TranslationValues};
use super::view::MergedView;
use crate::models::{EntityRecord, TranslationRecord};

/// Builds merged views from stored rows.
#[derive(Debug, Clone)]
pub struct ViewMerger {
    catalogue: Arc<LanguageCatalogue>,
    registry: Arc<FieldRegistry>,
}

impl ViewMerger {
    pub fn new(catalogue: Arc<LanguageCatalogue>, registry: Arc<FieldRegistry>) -> Self {
        Self {
            catalogue,
            registry,
        }
    }

    /// Every translatable attribute of `kind` set to its empty default in every
    /// catalogue language.
    fn defaults(&self, kind: EntityKind) -> TranslatedFields {
        self.registry
            .fields(kind)
            .iter()
            .map(|field| {
                let by_language = self
                    .catalogue
                    .iter()
                    .map(|language| (language.to_string(), field.shape.empty_value()))
                    .collect::<BTreeMap<_, _>>();
                (field.name.clone(), by_language)
            })
            .collect()
    }

    /// An unsaved view with default shared attributes and empty translations.
    pub fn blank(&self, kind: EntityKind) -> MergedView {
        MergedView {
            id: None,
            shared: SharedAttributes::empty(kind),
            translations: self.defaults(kind),
            stored_languages: BTreeSet::new(),
            uncatalogued: BTreeMap::new(),
        }
    }

    /// Merge a root row and its translation rows.
    pub fn merge(
        &self,
        root: &EntityRecord,
        translations: &[TranslationRecord],
    ) -> Result<MergedView, ContentError> {
        let kind = root
            .kind
            .parse::<EntityKind>()
            .map_err(|e| ContentError::Corrupt {
                id: root.id,
                reason: e.to_string(),
            })?;

        let shared: SharedAttributes =
            serde_json::from_value(root.shared.clone()).map_err(|e| ContentError::Corrupt {
                id: root.id,
                reason: format!("shared attributes: {e}"),
            })?;

        if shared.kind() != kind {
            return Err(ContentError::Corrupt {
                id: root.id,
                reason: format!("kind column is {kind} but shared attributes are {}", shared.kind()),
            });
        }

        let mut view = MergedView {
            id: Some(root.id),
            shared,
            translations: self.defaults(kind),
            stored_languages: BTreeSet::new(),
            uncatalogued: BTreeMap::new(),
        };

        for row in translations {
            let Some(object) = row.fields.as_object() else {
                warn!(entity_id = %root.id, language = %row.language, "translation fields are not an object");
                // The row exists, so the next save must overwrite it.
                if self.catalogue.contains(&row.language) {
                    view.stored_languages.insert(row.language.clone());
                }
                continue;
            };

            if !self.catalogue.contains(&row.language) {
                warn!(
                    entity_id = %root.id,
                    language = %row.language,
                    "translation row for a language outside the catalogue"
                );
                view.uncatalogued
                    .insert(row.language.clone(), self.decode_row(kind, root, row, object));
                continue;
            }

            for (name, value) in self.decode_row(kind, root, row, object) {
                if let Some(by_language) = view.translations.get_mut(&name) {
                    by_language.insert(row.language.clone(), value);
                }
            }
            view.stored_languages.insert(row.language.clone());
        }

        Ok(view)
    }

    /// Decode the registered attributes a row carries.
    ///
    /// Unregistered keys are ignored; values of the wrong shape become the
    /// empty default.
    fn decode_row(
        &self,
        kind: EntityKind,
        root: &EntityRecord,
        row: &TranslationRecord,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> TranslationValues {
        let mut values = TranslationValues::new();

        for (name, raw) in object {
            let Some(shape) = self.registry.shape_of(kind, name) else {
                debug!(entity_id = %root.id, field = %name, "ignoring unregistered translation field");
                continue;
            };
            if raw.is_null() {
                continue;
            }
            let value: FieldValue = shape.decode(raw).unwrap_or_else(|| {
                warn!(
                    entity_id = %root.id,
                    language = %row.language,
                    field = %name,
                    "stored translation has the wrong shape, using empty default"
                );
                shape.empty_value()
            });
            values.insert(name.clone(), value);
        }

        values
    }
}
