//! Multilingual entity content.
//!
//! Entities have one root row of shared attributes and one translation row
//! per language. Reads merge them into a [`MergedView`]; writes split a view
//! back into row payloads.

pub mod attributes;
pub mod error;
pub mod fields;
pub mod language;
pub mod memory;
pub mod merge;
pub mod repository;
pub mod service;
pub mod split;
pub mod validation;
pub mod value;
pub mod view;

pub use attributes::{CasinoAttributes, EntityKind, SharedAttributes, SlotAttributes, Volatility};
pub use error::{ContentError, FieldError, LanguageFailure, StoreOperation};
pub use fields::{FieldDef, FieldRegistry, FieldShape, RegistryError};
pub use language::{CatalogueError, LanguageCatalogue};
pub use memory::MemoryEntityRepository;
pub use merge::ViewMerger;
pub use repository::{EntityRepository, PgEntityRepository, StoredEntity};
pub use service::{DEFAULT_STORE_TIMEOUT, EntityService, SaveOptions};
pub use split::{EditSplitter, SplitPlan, TranslationPayload};
pub use validation::validate_view;
pub use value::{FieldValue, TranslatedFields, TranslationValues};
pub use view::{LocalizedView, MergedView};
