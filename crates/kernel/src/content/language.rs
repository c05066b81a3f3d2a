//! Language catalogue.
//!
//! The catalogue is the fixed, ordered list of language codes the site
//! supports. It decides which language tabs exist in the back-office even when
//! no translation row has been written yet. The first entry is the default
//! language used as the public fallback.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages shipped when `SUPPORTED_LANGUAGES` is not set.
pub const DEFAULT_LANGUAGES: &[&str] = &["en", "de", "es", "fr", "it", "pl", "pt-BR", "pt-PT"];

/// Catalogue construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("language catalogue must contain at least one language")]
    Empty,

    #[error("invalid language code '{code}': {reason}")]
    InvalidCode { code: String, reason: String },

    #[error("language '{0}' is listed more than once")]
    Duplicate(String),
}

/// Validate that a code follows the BCP 47 primary subtag format.
///
/// Accepts a lowercase 2-3 letter primary subtag, optionally followed by
/// hyphen-separated alphanumeric subtags ("en", "pt-BR", "zh-Hans").
fn validate_language_code(code: &str) -> Result<(), CatalogueError> {
    let invalid = |reason: &str| CatalogueError::InvalidCode {
        code: code.to_string(),
        reason: reason.to_string(),
    };

    if code.is_empty() || code.len() > 12 {
        return Err(invalid("must be 1-12 characters"));
    }

    let mut parts = code.split('-');

    match parts.next() {
        Some(primary) if (2..=3).contains(&primary.len()) => {
            if !primary.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(invalid("primary subtag must be lowercase letters"));
            }
        }
        _ => return Err(invalid("must start with a 2-3 letter primary subtag")),
    }

    for subtag in parts {
        if subtag.is_empty()
            || subtag.len() > 8
            || !subtag.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(invalid("subtags must be 1-8 alphanumeric characters"));
        }
    }

    Ok(())
}

/// Ordered set of supported language codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LanguageCatalogue {
    codes: Vec<String>,
}

impl LanguageCatalogue {
    /// Build a catalogue from codes in display order.
    pub fn new<I, S>(codes: I) -> Result<Self, CatalogueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut validated: Vec<String> = Vec::new();

        for code in codes {
            let code = code.into().trim().to_string();
            validate_language_code(&code)?;
            if validated.iter().any(|c| c.eq_ignore_ascii_case(&code)) {
                return Err(CatalogueError::Duplicate(code));
            }
            validated.push(code);
        }

        if validated.is_empty() {
            return Err(CatalogueError::Empty);
        }

        Ok(Self { codes: validated })
    }

    /// Parse a comma-separated list such as `en,de,pt-BR`.
    pub fn parse(list: &str) -> Result<Self, CatalogueError> {
        Self::new(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Default language (first entry).
    pub fn default_language(&self) -> &str {
        &self.codes[0]
    }

    /// Check whether a code is in the catalogue (exact match).
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// Find the catalogue spelling of a code, ignoring ASCII case.
    ///
    /// Request headers and query strings arrive in arbitrary case ("pt-br"),
    /// while the catalogue keeps the canonical form ("pt-BR").
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|c| c.eq_ignore_ascii_case(code))
            .map(String::as_str)
    }

    /// Iterate codes in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for LanguageCatalogue {
    fn default() -> Self {
        Self {
            codes: DEFAULT_LANGUAGES.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for LanguageCatalogue {
    type Error = CatalogueError;

    fn try_from(codes: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(codes)
    }
}

impl From<LanguageCatalogue> for Vec<String> {
    fn from(catalogue: LanguageCatalogue) -> Self {
        catalogue.codes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_order() {
        let catalogue = LanguageCatalogue::default();
        let codes: Vec<&str> = catalogue.iter().collect();
        assert_eq!(codes, DEFAULT_LANGUAGES);
        assert_eq!(catalogue.default_language(), "en");
    }

    #[test]
    fn default_catalogue_passes_validation() {
        assert!(LanguageCatalogue::new(DEFAULT_LANGUAGES.iter().copied()).is_ok());
    }

    #[test]
    fn parse_trims_and_skips_blanks() {
        let catalogue = LanguageCatalogue::parse(" fr, en ,,pt-BR ").unwrap();
        let codes: Vec<&str> = catalogue.iter().collect();
        assert_eq!(codes, vec!["fr", "en", "pt-BR"]);
        assert_eq!(catalogue.default_language(), "fr");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(LanguageCatalogue::parse(""), Err(CatalogueError::Empty));
    }

    #[test]
    fn rejects_duplicates_ignoring_case() {
        assert_eq!(
            LanguageCatalogue::parse("en,pt-BR,pt-br"),
            Err(CatalogueError::Duplicate("pt-br".to_string()))
        );
    }

    #[test]
    fn validate_language_code_accepts_valid() {
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("pt-BR").is_ok());
        assert!(validate_language_code("zh-Hans").is_ok());
        assert!(validate_language_code("ast").is_ok());
    }

    #[test]
    fn validate_language_code_rejects_invalid() {
        assert!(validate_language_code("").is_err(), "empty");
        assert!(validate_language_code("e").is_err(), "too short");
        assert!(validate_language_code("EN").is_err(), "uppercase primary");
        assert!(validate_language_code("en us").is_err(), "space");
        assert!(validate_language_code("../foo").is_err(), "path traversal");
        assert!(validate_language_code("en-").is_err(), "trailing hyphen");
        assert!(validate_language_code("abcdefghijklm").is_err(), "too long");
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let catalogue = LanguageCatalogue::default();
        assert_eq!(catalogue.resolve("pt-br"), Some("pt-BR"));
        assert_eq!(catalogue.resolve("DE"), Some("de"));
        assert_eq!(catalogue.resolve("ja"), None);
        assert!(catalogue.contains("pt-BR"));
        assert!(!catalogue.contains("pt-br"));
    }

    #[test]
    fn serde_round_trip_validates() {
        let catalogue: LanguageCatalogue = serde_json::from_str(r#"["en","fr"]"#).unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(serde_json::to_string(&catalogue).unwrap(), r#"["en","fr"]"#);

        let bad: Result<LanguageCatalogue, _> = serde_json::from_str(r#"["EN"]"#);
        assert!(bad.is_err());
    }
}
