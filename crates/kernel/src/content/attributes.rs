//! Entity kinds and their shared (language-independent) attributes.
//!
//! Shared attributes live on the root `entity` row and are identical in every
//! language. Each kind has a typed record; the tagged [`SharedAttributes`]
//! enum is what the rest of the content core passes around.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Casino,
    Slot,
}

impl EntityKind {
    /// All kinds, in listing order.
    pub const ALL: [EntityKind; 2] = [EntityKind::Casino, EntityKind::Slot];

    /// Machine name stored in the `entity.kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Casino => "casino",
            EntityKind::Slot => "slot",
        }
    }

    /// Names of the shared attributes for this kind.
    pub fn shared_field_names(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Casino => CasinoAttributes::FIELD_NAMES,
            EntityKind::Slot => SlotAttributes::FIELD_NAMES,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "casino" => Ok(EntityKind::Casino),
            "slot" => Ok(EntityKind::Slot),
            other => anyhow::bail!("unknown entity kind '{other}'"),
        }
    }
}

/// Shared attributes of a casino listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoAttributes {
    pub name: String,
    pub slug: String,
    /// Editorial rating, 0.0 to 5.0.
    pub rating: f64,
    pub min_deposit: f64,
    pub established_year: Option<i32>,
    pub licenses: Vec<String>,
    pub game_providers: Vec<String>,
    pub payment_methods: Vec<String>,
    pub game_categories: Vec<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
}

impl CasinoAttributes {
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "name",
        "slug",
        "rating",
        "min_deposit",
        "established_year",
        "licenses",
        "game_providers",
        "payment_methods",
        "game_categories",
        "logo_url",
        "website_url",
    ];
}

/// Slot volatility class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

/// Shared attributes of a slot game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotAttributes {
    pub name: String,
    pub slug: String,
    pub provider: String,
    /// Return to player, in percent.
    pub rtp: f64,
    pub volatility: Volatility,
    pub min_bet: f64,
    pub max_bet: f64,
    pub reels: u8,
    pub paylines: u32,
    pub release_year: Option<i32>,
    pub thumbnail_url: Option<String>,
}

impl SlotAttributes {
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "name",
        "slug",
        "provider",
        "rtp",
        "volatility",
        "min_bet",
        "max_bet",
        "reels",
        "paylines",
        "release_year",
        "thumbnail_url",
    ];
}

/// Shared attributes tagged by entity kind.
///
/// Serialized with a `kind` tag, which is also how it is stored in the
/// `entity.shared` JSONB column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SharedAttributes {
    Casino(CasinoAttributes),
    Slot(SlotAttributes),
}

impl SharedAttributes {
    /// Default attributes for a new entity of the given kind.
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Casino => SharedAttributes::Casino(CasinoAttributes::default()),
            EntityKind::Slot => SharedAttributes::Slot(SlotAttributes::default()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            SharedAttributes::Casino(_) => EntityKind::Casino,
            SharedAttributes::Slot(_) => EntityKind::Slot,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SharedAttributes::Casino(c) => &c.name,
            SharedAttributes::Slot(s) => &s.name,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            SharedAttributes::Casino(c) => &c.slug,
            SharedAttributes::Slot(s) => &s.slug,
        }
    }

    /// Sort key used by catalogue listings. Casinos rank by rating.
    pub fn rating(&self) -> Option<f64> {
        match self {
            SharedAttributes::Casino(c) => Some(c.rating),
            SharedAttributes::Slot(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_and_displays() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert!("poker".parse::<EntityKind>().is_err());
    }

    #[test]
    fn shared_attributes_tagged_by_kind() {
        let shared = SharedAttributes::Casino(CasinoAttributes {
            name: "Lucky".to_string(),
            rating: 4.5,
            ..Default::default()
        });

        let json = serde_json::to_value(&shared).unwrap();
        assert_eq!(json["kind"], "casino");
        assert_eq!(json["rating"], 4.5);

        let parsed: SharedAttributes = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, shared);
        assert_eq!(parsed.kind(), EntityKind::Casino);
    }

    #[test]
    fn missing_attributes_fall_back_to_defaults() {
        let parsed: SharedAttributes =
            serde_json::from_value(serde_json::json!({"kind": "slot", "name": "Reels"})).unwrap();

        let SharedAttributes::Slot(slot) = parsed else {
            panic!("expected slot attributes");
        };
        assert_eq!(slot.name, "Reels");
        assert_eq!(slot.volatility, Volatility::Medium);
        assert!(slot.thumbnail_url.is_none());
    }

    #[test]
    fn field_names_match_serialized_keys() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_value(SharedAttributes::empty(kind)).unwrap();
            let object = json.as_object().unwrap();
            for name in kind.shared_field_names() {
                assert!(object.contains_key(*name), "{kind}: missing {name}");
            }
            // Every serialized key except the tag is a declared field.
            assert_eq!(object.len(), kind.shared_field_names().len() + 1);
        }
    }
}
