//! Merged and localized views of an entity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attributes::{EntityKind, SharedAttributes};
use super::language::LanguageCatalogue;
use super::value::{FieldValue, TranslatedFields, TranslationValues};

/// Language-keyed view of one entity.
///
/// Shared attributes appear once; every translatable attribute is a map from
/// catalogue language to value. Built by the merger on every load and split
/// back into row writes on every save; never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedView {
    /// `None` until the root row has been created.
    pub id: Option<Uuid>,

    pub shared: SharedAttributes,

    pub translations: TranslatedFields,

    /// Catalogue languages that had a stored row at load time.
    #[serde(default)]
    pub stored_languages: BTreeSet<String>,

    /// Rows for languages outside the catalogue, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub uncatalogued: BTreeMap<String, TranslationValues>,
}

impl MergedView {
    pub fn kind(&self) -> EntityKind {
        self.shared.kind()
    }

    /// Value of a translatable attribute in one language.
    pub fn translation(&self, field: &str, language: &str) -> Option<&FieldValue> {
        self.translations.get(field)?.get(language)
    }

    /// Set a translatable attribute in one language.
    pub fn set_translation(&mut self, field: &str, language: &str, value: impl Into<FieldValue>) {
        self.translations
            .entry(field.to_string())
            .or_default()
            .insert(language.to_string(), value.into());
    }

    /// Copy every (attribute, language) value this view leaves out from
    /// `stored`. Values already present, empty or not, are kept.
    pub fn fill_missing_from(&mut self, stored: &MergedView) {
        for (field, by_language) in &stored.translations {
            let target = self.translations.entry(field.clone()).or_default();
            for (language, value) in by_language {
                target
                    .entry(language.clone())
                    .or_insert_with(|| value.clone());
            }
        }
    }

    /// Slice the view down to a single language for public display.
    ///
    /// Empty values fall back to the catalogue default language, attribute by
    /// attribute, so a half-translated review still shows complete sections.
    pub fn localize(&self, language: &str, catalogue: &LanguageCatalogue) -> LocalizedView {
        let language = catalogue
            .resolve(language)
            .unwrap_or_else(|| catalogue.default_language());
        let fallback = catalogue.default_language();

        let fields = self
            .translations
            .iter()
            .filter_map(|(name, by_language)| {
                let value = by_language
                    .get(language)
                    .filter(|v| !v.is_empty())
                    .or_else(|| by_language.get(fallback))?;
                Some((name.clone(), value.clone()))
            })
            .collect();

        LocalizedView {
            id: self.id,
            language: language.to_string(),
            shared: self.shared.clone(),
            fields,
        }
    }
}

/// One language's slice of an entity, as the public catalogue renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedView {
    pub id: Option<Uuid>,
    pub language: String,
    pub shared: SharedAttributes,
    pub fields: TranslationValues,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::CasinoAttributes;

    fn view() -> MergedView {
        let mut view = MergedView {
            id: Some(Uuid::nil()),
            shared: SharedAttributes::Casino(CasinoAttributes::default()),
            translations: TranslatedFields::new(),
            stored_languages: BTreeSet::new(),
            uncatalogued: BTreeMap::new(),
        };
        view.set_translation("description", "en", "Great casino");
        view.set_translation("description", "de", "Tolles Casino");
        view.set_translation("description", "fr", "");
        view.set_translation("review", "en", "");
        view.set_translation("review", "fr", "Avis");
        view
    }

    #[test]
    fn fill_missing_keeps_sent_values() {
        let stored = view();
        let mut sparse = MergedView {
            translations: TranslatedFields::new(),
            ..stored.clone()
        };
        sparse.set_translation("description", "fr", "Bon casino");
        sparse.set_translation("description", "de", "");

        sparse.fill_missing_from(&stored);

        assert_eq!(
            sparse.translation("description", "en"),
            Some(&FieldValue::from("Great casino"))
        );
        assert_eq!(
            sparse.translation("description", "de"),
            Some(&FieldValue::from(""))
        );
        assert_eq!(
            sparse.translation("description", "fr"),
            Some(&FieldValue::from("Bon casino"))
        );
        assert_eq!(
            sparse.translation("review", "fr"),
            Some(&FieldValue::from("Avis"))
        );
    }

    #[test]
    fn localize_picks_language() {
        let catalogue = LanguageCatalogue::default();
        let localized = view().localize("de", &catalogue);
        assert_eq!(localized.language, "de");
        assert_eq!(localized.fields["description"], FieldValue::from("Tolles Casino"));
    }

    #[test]
    fn localize_falls_back_per_field() {
        let catalogue = LanguageCatalogue::default();
        let localized = view().localize("fr", &catalogue);
        assert_eq!(localized.fields["description"], FieldValue::from("Great casino"));
        assert_eq!(localized.fields["review"], FieldValue::from("Avis"));
    }

    #[test]
    fn localize_unknown_language_uses_default() {
        let catalogue = LanguageCatalogue::default();
        let localized = view().localize("ja", &catalogue);
        assert_eq!(localized.language, "en");

        let localized = view().localize("DE", &catalogue);
        assert_eq!(localized.language, "de");
    }

    #[test]
    fn uncatalogued_omitted_when_empty() {
        let json = serde_json::to_value(view()).unwrap();
        assert!(json.get("uncatalogued").is_none());
        assert_eq!(json["shared"]["kind"], "casino");
        assert_eq!(json["translations"]["description"]["de"], "Tolles Casino");
    }
}
