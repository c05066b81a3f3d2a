//! Database models.

pub mod entity;
pub mod entity_translation;

pub use entity::EntityRecord;
pub use entity_translation::TranslationRecord;
