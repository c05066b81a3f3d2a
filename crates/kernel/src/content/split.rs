//! Edit splitter: [`MergedView`] → root payload + per-language payloads.

use std::sync::Arc;

use super::attributes::SharedAttributes;
use super::fields::FieldRegistry;
use super::language::LanguageCatalogue;
use super::value::TranslationValues;
use super::view::MergedView;

/// Values to upsert for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationPayload {
    pub language: String,
    pub fields: TranslationValues,
}

impl TranslationPayload {
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }
}

/// Writes derived from one merged view.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    /// Payload for the root row.
    pub shared: SharedAttributes,

    /// One payload per catalogue language to upsert, in catalogue order.
    pub translations: Vec<TranslationPayload>,
}

impl SplitPlan {
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.translations.iter().map(|t| t.language.as_str())
    }

    /// Drop payloads identical to the stored state.
    pub fn retain_changed(&mut self, stored: &MergedView, splitter: &EditSplitter) {
        self.translations
            .retain(|payload| splitter.language_payload(stored, &payload.language) != *payload);
    }
}

/// Decomposes merged views into row writes.
#[derive(Debug, Clone)]
pub struct EditSplitter {
    catalogue: Arc<LanguageCatalogue>,
    registry: Arc<FieldRegistry>,
}

impl EditSplitter {
    pub fn new(catalogue: Arc<LanguageCatalogue>, registry: Arc<FieldRegistry>) -> Self {
        Self {
            catalogue,
            registry,
        }
    }

    /// Extract one language's values for every registered attribute.
    ///
    /// Attributes missing from the view are filled with their empty default,
    /// so the payload always carries the full attribute set.
    pub fn language_payload(&self, view: &MergedView, language: &str) -> TranslationPayload {
        let fields = self
            .registry
            .fields(view.kind())
            .iter()
            .map(|field| {
                let value = view
                    .translation(&field.name, language)
                    .cloned()
                    .unwrap_or_else(|| field.shape.empty_value());
                (field.name.clone(), value)
            })
            .collect();

        TranslationPayload {
            language: language.to_string(),
            fields,
        }
    }

    /// Split a view into its root payload and translation payloads.
    ///
    /// An all-empty payload is written only when the language already has a
    /// stored row (so clearing a language persists); otherwise it is skipped,
    /// since a missing row and an empty row merge to the same view.
    /// Uncatalogued languages are never written.
    pub fn split(&self, view: &MergedView) -> SplitPlan {
        let translations = self
            .catalogue
            .iter()
            .map(|language| self.language_payload(view, language))
            .filter(|payload| !payload.is_empty() || view.stored_languages.contains(&payload.language))
            .collect();

        SplitPlan {
            shared: view.shared.clone(),
            translations,
        }
    }
}
