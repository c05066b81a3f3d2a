//! HTTP middleware components.

pub mod language;

pub use language::{ResolvedLanguage, resolve_language};
