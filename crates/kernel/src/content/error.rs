//! Content core error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::attributes::EntityKind;

/// Repository operation, attached to store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    LoadEntity,
    LoadAllEntities,
    SaveRoot,
    UpsertTranslation,
    DeleteEntity,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOperation::LoadEntity => "load entity",
            StoreOperation::LoadAllEntities => "load all entities",
            StoreOperation::SaveRoot => "save root",
            StoreOperation::UpsertTranslation => "upsert translation",
            StoreOperation::DeleteEntity => "delete entity",
        })
    }
}

/// A single validation failure, reported per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn shared(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            language: None,
            message: message.into(),
        }
    }

    pub fn translated(field: &str, language: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            language: Some(language.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language {
            Some(language) => write!(f, "{}[{}]: {}", self.field, language, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// A failed per-language upsert inside a partial write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageFailure {
    pub language: String,
    pub reason: String,
    /// Whether resubmitting may succeed (timeouts).
    pub retryable: bool,
}

/// Content core errors.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("entity {id} not found")]
    NotFound { id: Uuid },

    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("entity {id} is a {actual}, not a {expected}")]
    KindMismatch {
        id: Uuid,
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("{operation} failed{}", entity_suffix(.entity_id))]
    Store {
        operation: StoreOperation,
        entity_id: Option<Uuid>,
        #[source]
        source: anyhow::Error,
    },

    #[error("{operation} timed out{}", entity_suffix(.entity_id))]
    Timeout {
        operation: StoreOperation,
        entity_id: Option<Uuid>,
    },

    #[error(
        "entity {entity_id} saved, but translations failed for: {}",
        failed_languages(.failures).join(", ")
    )]
    PartialWrite {
        entity_id: Uuid,
        failures: Vec<LanguageFailure>,
    },

    #[error("stored entity {id} is unreadable: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

impl ContentError {
    /// Whether the caller may resubmit the same operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            ContentError::Timeout { .. } => true,
            ContentError::PartialWrite { failures, .. } => failures.iter().all(|f| f.retryable),
            _ => false,
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn entity_suffix(entity_id: &Option<Uuid>) -> String {
    entity_id
        .map(|id| format!(" for entity {id}"))
        .unwrap_or_default()
}

/// Languages named by a list of failures, in order.
pub fn failed_languages(failures: &[LanguageFailure]) -> Vec<&str> {
    failures.iter().map(|f| f.language.as_str()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_write_names_languages() {
        let err = ContentError::PartialWrite {
            entity_id: Uuid::nil(),
            failures: vec![
                LanguageFailure {
                    language: "de".to_string(),
                    reason: "connection reset".to_string(),
                    retryable: false,
                },
                LanguageFailure {
                    language: "pt-BR".to_string(),
                    reason: "timed out".to_string(),
                    retryable: true,
                },
            ],
        };

        let message = err.to_string();
        assert!(message.contains("de, pt-BR"), "{message}");
        assert!(!err.is_retryable());
    }

    #[test]
    fn store_error_names_operation_and_entity() {
        let id = Uuid::now_v7();
        let err = ContentError::Store {
            operation: StoreOperation::SaveRoot,
            entity_id: Some(id),
            source: anyhow::anyhow!("connection refused"),
        };
        assert_eq!(err.to_string(), format!("save root failed for entity {id}"));

        let err = ContentError::Timeout {
            operation: StoreOperation::LoadAllEntities,
            entity_id: None,
        };
        assert_eq!(err.to_string(), "load all entities timed out");
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_lists_fields() {
        let err = ContentError::Validation(vec![
            FieldError::shared("rating", "must be between 0 and 5"),
            FieldError::translated("description", "fr", "unknown language"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: rating: must be between 0 and 5; description[fr]: unknown language"
        );
    }
}
