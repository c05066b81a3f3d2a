//! Translatable field registry.
//!
//! Declares, per entity kind, which attributes vary by language and what
//! shape their values take. Anything not registered here is a shared
//! attribute. The registry is static configuration built once at startup;
//! the merger, splitter, and validator are all driven by it, so there is no
//! per-field code anywhere else.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::attributes::EntityKind;
use super::value::FieldValue;

/// Bonus categories shown on a casino review.
pub const BONUS_CATEGORIES: &[&str] = &["welcome", "no_deposit", "free_spins", "cashback", "reload"];

/// Per-category bonus attributes.
pub const BONUS_ATTRIBUTES: &[&str] = &["rate", "amount", "validity", "requirements", "disclaimer"];

/// Value shape of a translatable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    SingleLine,
    MultiLine,
    StringList,
}

impl FieldShape {
    /// Empty default used when no translation exists.
    pub fn empty_value(&self) -> FieldValue {
        match self {
            FieldShape::SingleLine | FieldShape::MultiLine => FieldValue::Text(String::new()),
            FieldShape::StringList => FieldValue::List(Vec::new()),
        }
    }

    /// Check that a value has this shape.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldShape::SingleLine, FieldValue::Text(text)) => !text.contains(['\n', '\r']),
            (FieldShape::MultiLine, FieldValue::Text(_)) => true,
            (FieldShape::StringList, FieldValue::List(_)) => true,
            _ => false,
        }
    }

    /// Decode a stored JSON value into this shape.
    ///
    /// Returns `None` when the stored value has the wrong JSON type.
    pub fn decode(&self, value: &serde_json::Value) -> Option<FieldValue> {
        match self {
            FieldShape::SingleLine | FieldShape::MultiLine => {
                value.as_str().map(|s| FieldValue::Text(s.to_string()))
            }
            FieldShape::StringList => value
                .as_array()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
        }
    }
}

/// A translatable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub shape: FieldShape,
}

/// Registry configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{kind}: invalid field name '{name}': must be lowercase snake_case")]
    InvalidName { kind: EntityKind, name: String },

    #[error("{kind}: field '{name}' registered twice")]
    Duplicate { kind: EntityKind, name: String },

    #[error("{kind}: field '{name}' is a shared attribute and cannot be translatable")]
    SharedConflict { kind: EntityKind, name: String },
}

fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Registry of translatable attributes per entity kind.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    kinds: HashMap<EntityKind, Vec<FieldDef>>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a translatable attribute.
    ///
    /// Rejects malformed names, duplicates, and names that collide with a
    /// shared attribute of the same kind.
    pub fn register(
        &mut self,
        kind: EntityKind,
        name: &str,
        shape: FieldShape,
    ) -> Result<&mut Self, RegistryError> {
        if !is_snake_case(name) {
            return Err(RegistryError::InvalidName {
                kind,
                name: name.to_string(),
            });
        }
        if kind.shared_field_names().contains(&name) {
            return Err(RegistryError::SharedConflict {
                kind,
                name: name.to_string(),
            });
        }

        let fields = self.kinds.entry(kind).or_default();
        if fields.iter().any(|f| f.name == name) {
            return Err(RegistryError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
        fields.push(FieldDef {
            name: name.to_string(),
            shape,
        });

        Ok(self)
    }

    /// The registry shipped with the site: casino and slot translatables.
    pub fn standard() -> Result<Self, RegistryError> {
        use FieldShape::{MultiLine, SingleLine, StringList};

        let mut registry = Self::new();
        let casino = EntityKind::Casino;

        registry
            .register(casino, "description", MultiLine)?
            .register(casino, "review", MultiLine)?
            .register(casino, "bonus_intro", MultiLine)?
            .register(casino, "games_intro", MultiLine)?
            .register(casino, "payments_intro", MultiLine)?;

        for category in BONUS_CATEGORIES {
            for attribute in BONUS_ATTRIBUTES {
                registry.register(casino, &format!("{category}_bonus_{attribute}"), SingleLine)?;
            }
        }

        registry
            .register(casino, "pros", StringList)?
            .register(casino, "cons", StringList)?
            .register(casino, "screenshots", StringList)?;

        let slot = EntityKind::Slot;
        registry
            .register(slot, "description", MultiLine)?
            .register(slot, "review", MultiLine)?
            .register(slot, "features", StringList)?
            .register(slot, "screenshots", StringList)?;

        Ok(registry)
    }

    /// Translatable attributes of a kind, in registration order.
    pub fn fields(&self, kind: EntityKind) -> &[FieldDef] {
        self.kinds.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Shape of a translatable attribute, or `None` if it is not translatable.
    pub fn shape_of(&self, kind: EntityKind, name: &str) -> Option<FieldShape> {
        self.fields(kind)
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.shape)
    }

    /// Unknown names are shared, never translatable.
    pub fn is_translatable(&self, kind: EntityKind, name: &str) -> bool {
        self.shape_of(kind, name).is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_builds() {
        let registry = FieldRegistry::standard().unwrap();

        let casino = registry.fields(EntityKind::Casino);
        assert_eq!(casino.len(), 5 + BONUS_CATEGORIES.len() * BONUS_ATTRIBUTES.len() + 3);
        assert_eq!(casino[0].name, "description");

        assert_eq!(
            registry.shape_of(EntityKind::Casino, "welcome_bonus_rate"),
            Some(FieldShape::SingleLine)
        );
        assert_eq!(
            registry.shape_of(EntityKind::Slot, "features"),
            Some(FieldShape::StringList)
        );
    }

    #[test]
    fn unknown_names_are_shared() {
        let registry = FieldRegistry::standard().unwrap();
        assert!(!registry.is_translatable(EntityKind::Casino, "rating"));
        assert!(!registry.is_translatable(EntityKind::Casino, "no_such_field"));
        assert!(!registry.is_translatable(EntityKind::Slot, "welcome_bonus_rate"));
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut registry = FieldRegistry::new();
        registry
            .register(EntityKind::Casino, "description", FieldShape::MultiLine)
            .unwrap();
        let err = registry
            .register(EntityKind::Casino, "description", FieldShape::SingleLine)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));

        // Same name on a different kind is fine.
        assert!(
            registry
                .register(EntityKind::Slot, "description", FieldShape::MultiLine)
                .is_ok()
        );
    }

    #[test]
    fn register_rejects_shared_names() {
        let mut registry = FieldRegistry::new();
        let err = registry
            .register(EntityKind::Casino, "rating", FieldShape::SingleLine)
            .unwrap_err();
        assert!(matches!(err, RegistryError::SharedConflict { .. }));
    }

    #[test]
    fn register_rejects_bad_names() {
        let mut registry = FieldRegistry::new();
        for name in ["", "Description", "1st", "bonus-rate", "a b"] {
            assert!(
                registry
                    .register(EntityKind::Casino, name, FieldShape::SingleLine)
                    .is_err(),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn shapes_accept_and_decode() {
        assert!(FieldShape::SingleLine.accepts(&FieldValue::from("one line")));
        assert!(!FieldShape::SingleLine.accepts(&FieldValue::from("two\nlines")));
        assert!(FieldShape::MultiLine.accepts(&FieldValue::from("two\nlines")));
        assert!(!FieldShape::MultiLine.accepts(&FieldValue::List(vec![])));
        assert!(FieldShape::StringList.accepts(&FieldValue::List(vec![])));

        assert_eq!(
            FieldShape::StringList.decode(&serde_json::json!(["a", "b"])),
            Some(FieldValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(FieldShape::StringList.decode(&serde_json::json!(["a", 1])), None);
        assert_eq!(FieldShape::MultiLine.decode(&serde_json::json!(3)), None);
    }
}
