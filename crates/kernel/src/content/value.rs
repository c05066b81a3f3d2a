//! Translatable attribute values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of one translatable attribute in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Whether the value is the empty default for its shape.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// Attribute name → value for a single language (one translation row).
pub type TranslationValues = BTreeMap<String, FieldValue>;

/// Attribute name → (language code → value), the merged form.
pub type TranslatedFields = BTreeMap<String, BTreeMap<String, FieldValue>>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_shapes() {
        let text: FieldValue = serde_json::from_str(r#""Great casino""#).unwrap();
        assert_eq!(text, FieldValue::from("Great casino"));

        let list: FieldValue = serde_json::from_str(r#"["a.png","b.png"]"#).unwrap();
        assert_eq!(list.as_list().unwrap().len(), 2);

        assert!(serde_json::from_str::<FieldValue>("42").is_err());
    }

    #[test]
    fn emptiness() {
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::from("x").is_empty());
        assert!(!FieldValue::List(vec![String::new()]).is_empty());
    }
}
