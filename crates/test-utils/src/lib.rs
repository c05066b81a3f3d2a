//! Croupier test utilities.
//!
//! Fixture builders producing merged-view JSON for casinos and slots, plus
//! assertion helpers for API responses.

use serde_json::{Map, Value as JsonValue, json};
use uuid::Uuid;

/// Create a test casino with valid shared attributes.
pub fn test_casino(name: &str) -> TestEntity {
    TestEntity {
        id: None,
        shared: json!({
            "kind": "casino",
            "name": name,
            "slug": slugify(name),
            "rating": 4.0,
            "min_deposit": 10.0,
            "licenses": ["MGA"],
            "payment_methods": ["Visa", "Skrill"],
        }),
        translations: Map::new(),
    }
}

/// Create a test slot with valid shared attributes.
pub fn test_slot(name: &str) -> TestEntity {
    TestEntity {
        id: None,
        shared: json!({
            "kind": "slot",
            "name": name,
            "slug": slugify(name),
            "provider": "Spinworks",
            "rtp": 96.1,
            "volatility": "high",
            "min_bet": 0.1,
            "max_bet": 100.0,
            "reels": 5,
            "paylines": 20,
        }),
        translations: Map::new(),
    }
}

/// Lowercase, hyphen-separated form of a display name.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A merged-view fixture builder.
#[derive(Debug, Clone)]
pub struct TestEntity {
    pub id: Option<Uuid>,
    pub shared: JsonValue,
    pub translations: Map<String, JsonValue>,
}

impl TestEntity {
    /// Set the entity ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Set a shared attribute.
    pub fn with_shared(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.shared.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Set the casino rating.
    pub fn with_rating(self, rating: f64) -> Self {
        self.with_shared("rating", json!(rating))
    }

    /// Set one translated value.
    pub fn with_translation(mut self, field: &str, language: &str, value: impl Into<JsonValue>) -> Self {
        let by_language = self
            .translations
            .entry(field.to_string())
            .or_insert_with(|| json!({}));
        if let Some(obj) = by_language.as_object_mut() {
            obj.insert(language.to_string(), value.into());
        }
        self
    }

    /// Merged-view JSON as accepted by the admin API.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "shared": self.shared,
            "translations": self.translations,
        })
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that an error body names a field.
    pub fn names_field(body: &Value, field: &str) {
        let named = body["fields"]
            .as_array()
            .is_some_and(|fields| fields.iter().any(|f| f["field"] == field));
        assert!(named, "Expected error body to name field '{field}', got: {body}");
    }

    /// Assert that every catalogue language has a value for a field.
    pub fn complete_for(view: &Value, field: &str, languages: &[&str]) {
        for language in languages {
            assert!(
                !view["translations"][field][*language].is_null(),
                "Expected '{field}' to have a '{language}' value, got: {}",
                view["translations"][field]
            );
        }
    }
}
