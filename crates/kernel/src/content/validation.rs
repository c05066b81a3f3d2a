//! Merged view validation.
//!
//! Runs before any store call. Every problem is collected so the admin sees
//! all of them at once; a single failure blocks the whole write.

use chrono::Datelike;
use url::Url;

use super::attributes::{CasinoAttributes, SharedAttributes, SlotAttributes};
use super::error::FieldError;
use super::fields::{FieldRegistry, FieldShape};
use super::language::LanguageCatalogue;
use super::value::FieldValue;
use super::view::MergedView;

/// Maximum length of single-line translated text.
const MAX_SINGLE_LINE: usize = 255;

/// Maximum length of names and list entries.
const MAX_NAME: usize = 255;

/// First year a listed casino or slot can plausibly date from.
const EARLIEST_YEAR: i32 = 1990;

/// Validate a merged view against the catalogue and registry.
pub fn validate_view(
    view: &MergedView,
    catalogue: &LanguageCatalogue,
    registry: &FieldRegistry,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    match &view.shared {
        SharedAttributes::Casino(casino) => validate_casino(casino, &mut errors),
        SharedAttributes::Slot(slot) => validate_slot(slot, &mut errors),
    }

    let kind = view.kind();
    for (field, by_language) in &view.translations {
        let Some(shape) = registry.shape_of(kind, field) else {
            errors.push(FieldError::shared(field, format!("not a translatable {kind} field")));
            continue;
        };

        for (language, value) in by_language {
            if !catalogue.contains(language) {
                errors.push(FieldError::translated(
                    field,
                    language,
                    "language is not in the catalogue",
                ));
                continue;
            }
            validate_translation(field, language, shape, value, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_translation(
    field: &str,
    language: &str,
    shape: FieldShape,
    value: &FieldValue,
    errors: &mut Vec<FieldError>,
) {
    if !shape.accepts(value) {
        let expected = match shape {
            FieldShape::SingleLine => "a single line of text",
            FieldShape::MultiLine => "text",
            FieldShape::StringList => "a list of strings",
        };
        errors.push(FieldError::translated(field, language, format!("must be {expected}")));
        return;
    }

    match value {
        FieldValue::Text(text) if shape == FieldShape::SingleLine => {
            if text.chars().count() > MAX_SINGLE_LINE {
                errors.push(FieldError::translated(
                    field,
                    language,
                    format!("must be at most {MAX_SINGLE_LINE} characters"),
                ));
            }
        }
        FieldValue::List(items) => {
            for item in items {
                if item.trim().is_empty() {
                    errors.push(FieldError::translated(field, language, "entries must not be empty"));
                } else if field == "screenshots" && !is_http_url(item) {
                    errors.push(FieldError::translated(
                        field,
                        language,
                        format!("'{item}' is not an absolute http(s) URL"),
                    ));
                }
            }
        }
        FieldValue::Text(_) => {}
    }
}

fn validate_casino(casino: &CasinoAttributes, errors: &mut Vec<FieldError>) {
    validate_name(&casino.name, errors);
    validate_slug(&casino.slug, errors);

    if !(0.0..=5.0).contains(&casino.rating) {
        errors.push(FieldError::shared("rating", "must be between 0 and 5"));
    }
    if !casino.min_deposit.is_finite() || casino.min_deposit < 0.0 {
        errors.push(FieldError::shared("min_deposit", "must not be negative"));
    }
    validate_year("established_year", casino.established_year, errors);

    for (field, items) in [
        ("licenses", &casino.licenses),
        ("game_providers", &casino.game_providers),
        ("payment_methods", &casino.payment_methods),
        ("game_categories", &casino.game_categories),
    ] {
        validate_list(field, items, errors);
    }

    validate_url("logo_url", casino.logo_url.as_deref(), errors);
    validate_url("website_url", casino.website_url.as_deref(), errors);
}

fn validate_slot(slot: &SlotAttributes, errors: &mut Vec<FieldError>) {
    validate_name(&slot.name, errors);
    validate_slug(&slot.slug, errors);

    if slot.provider.trim().is_empty() {
        errors.push(FieldError::shared("provider", "must not be empty"));
    }
    if !(0.0..=100.0).contains(&slot.rtp) {
        errors.push(FieldError::shared("rtp", "must be a percentage between 0 and 100"));
    }
    if !slot.min_bet.is_finite() || slot.min_bet < 0.0 {
        errors.push(FieldError::shared("min_bet", "must not be negative"));
    }
    if !slot.max_bet.is_finite() || slot.max_bet < slot.min_bet {
        errors.push(FieldError::shared("max_bet", "must not be less than min_bet"));
    }
    if slot.reels == 0 {
        errors.push(FieldError::shared("reels", "must be at least 1"));
    }
    validate_year("release_year", slot.release_year, errors);
    validate_url("thumbnail_url", slot.thumbnail_url.as_deref(), errors);
}

fn validate_name(name: &str, errors: &mut Vec<FieldError>) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::shared("name", "must not be empty"));
    } else if trimmed.chars().count() > MAX_NAME {
        errors.push(FieldError::shared(
            "name",
            format!("must be at most {MAX_NAME} characters"),
        ));
    }
}

/// Slugs are lowercase ASCII alphanumerics and single hyphens.
fn validate_slug(slug: &str, errors: &mut Vec<FieldError>) {
    let valid = !slug.is_empty()
        && slug.len() <= 128
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');

    if !valid {
        errors.push(FieldError::shared(
            "slug",
            "must be 1-128 lowercase letters, digits, and hyphens",
        ));
    }
}

fn validate_year(field: &str, year: Option<i32>, errors: &mut Vec<FieldError>) {
    let Some(year) = year else {
        return;
    };
    let current = chrono::Utc::now().year();
    if !(EARLIEST_YEAR..=current).contains(&year) {
        errors.push(FieldError::shared(
            field,
            format!("must be between {EARLIEST_YEAR} and {current}"),
        ));
    }
}

fn validate_list(field: &str, items: &[String], errors: &mut Vec<FieldError>) {
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            errors.push(FieldError::shared(field, "entries must not be empty"));
        } else if trimmed.chars().count() > MAX_NAME {
            errors.push(FieldError::shared(
                field,
                format!("entries must be at most {MAX_NAME} characters"),
            ));
        }
    }
}

fn validate_url(field: &str, url: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(url) = url
        && !is_http_url(url)
    {
        errors.push(FieldError::shared(field, "must be an absolute http(s) URL"));
    }
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}
