//! Closed category enumerations for each form

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::FormError;
use crate::catalog::Catalog;

/// Whether a category takes one choice or several
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Dropdown: one option, overridden by free text
    Single,
    /// Checkboxes: any number of options plus a free-text list
    Multi,
}

/// A category identifier belonging to one form
pub trait Category: Copy + Ord + Eq + Hash + fmt::Debug + 'static {
    /// Form name used in messages ("character", "monster", "group")
    const FORM: &'static str;

    /// Every category in display order
    fn all() -> &'static [Self];

    /// Kebab-case identifier used in config, catalog and commands
    fn id(self) -> &'static str;

    /// Human-readable label
    fn label(self) -> &'static str;

    fn cardinality(self) -> Cardinality;

    /// Option list for this category in display order
    fn options(self, catalog: &Catalog) -> &[String];

    /// Resolve an identifier or label, ignoring ASCII case
    fn parse(raw: &str) -> Result<Self, FormError> {
        let wanted = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FormError::UnknownCategory {
                form: Self::FORM,
                name: wanted.to_string(),
            })
    }
}

/// Character form categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterField {
    Race,
    Gender,
    RoleClass,
    Age,
    FacialExpression,
    Stature,
    Build,
    Attractiveness,
    Background,
    HeadHair,
    FacialHair,
    BodyHair,
    NotableTraits,
    ClothingArmor,
    Accessories,
    Framing,
}

impl Category for CharacterField {
    const FORM: &'static str = "character";

    fn all() -> &'static [Self] {
        &[
            Self::Race,
            Self::Gender,
            Self::RoleClass,
            Self::Age,
            Self::FacialExpression,
            Self::Stature,
            Self::Build,
            Self::Attractiveness,
            Self::Background,
            Self::HeadHair,
            Self::FacialHair,
            Self::BodyHair,
            Self::NotableTraits,
            Self::ClothingArmor,
            Self::Accessories,
            Self::Framing,
        ]
    }

    fn id(self) -> &'static str {
        match self {
            Self::Race => "race",
            Self::Gender => "gender",
            Self::RoleClass => "role-class",
            Self::Age => "age",
            Self::FacialExpression => "facial-expression",
            Self::Stature => "stature",
            Self::Build => "build",
            Self::Attractiveness => "attractiveness",
            Self::Background => "background",
            Self::HeadHair => "head-hair",
            Self::FacialHair => "facial-hair",
            Self::BodyHair => "body-hair",
            Self::NotableTraits => "notable-traits",
            Self::ClothingArmor => "clothing-armor",
            Self::Accessories => "accessories",
            Self::Framing => "framing",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Race => "Race",
            Self::Gender => "Gender",
            Self::RoleClass => "Role / Class",
            Self::Age => "Age",
            Self::FacialExpression => "Facial Expression",
            Self::Stature => "Stature",
            Self::Build => "Build / Body Type",
            Self::Attractiveness => "Attractiveness",
            Self::Background => "Background / Ambience",
            Self::HeadHair => "Head Hair",
            Self::FacialHair => "Facial Hair",
            Self::BodyHair => "Body Hair",
            Self::NotableTraits => "Notable Traits",
            Self::ClothingArmor => "Clothing / Armor",
            Self::Accessories => "Accessories",
            Self::Framing => "Framing",
        }
    }

    fn cardinality(self) -> Cardinality {
        match self {
            Self::HeadHair
            | Self::FacialHair
            | Self::BodyHair
            | Self::NotableTraits
            | Self::ClothingArmor
            | Self::Accessories
            | Self::Framing => Cardinality::Multi,
            _ => Cardinality::Single,
        }
    }

    fn options(self, catalog: &Catalog) -> &[String] {
        catalog.character.get(&self).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Monster form categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonsterField {
    CreatureType,
    Size,
    Biome,
    Behavior,
    ThreatLevel,
    Background,
    Anatomy,
    Surface,
    Abilities,
    Framing,
}

impl Category for MonsterField {
    const FORM: &'static str = "monster";

    fn all() -> &'static [Self] {
        &[
            Self::CreatureType,
            Self::Size,
            Self::Biome,
            Self::Behavior,
            Self::ThreatLevel,
            Self::Background,
            Self::Anatomy,
            Self::Surface,
            Self::Abilities,
            Self::Framing,
        ]
    }

    fn id(self) -> &'static str {
        match self {
            Self::CreatureType => "creature-type",
            Self::Size => "size",
            Self::Biome => "biome",
            Self::Behavior => "behavior",
            Self::ThreatLevel => "threat-level",
            Self::Background => "background",
            Self::Anatomy => "anatomy",
            Self::Surface => "surface",
            Self::Abilities => "abilities",
            Self::Framing => "framing",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::CreatureType => "Creature Type",
            Self::Size => "Size",
            Self::Biome => "Biome / Environment",
            Self::Behavior => "Behavior",
            Self::ThreatLevel => "Threat Level",
            Self::Background => "Background / Ambience",
            Self::Anatomy => "Anatomy / Morphology",
            Self::Surface => "Surface / Texture",
            Self::Abilities => "Abilities / Attacks",
            Self::Framing => "Framing",
        }
    }

    fn cardinality(self) -> Cardinality {
        match self {
            Self::Anatomy | Self::Surface | Self::Abilities | Self::Framing => Cardinality::Multi,
            _ => Cardinality::Single,
        }
    }

    fn options(self, catalog: &Catalog) -> &[String] {
        catalog.monster.get(&self).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Group scene settings with an option list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupField {
    Action,
    Location,
    Theme,
    Camera,
    Lighting,
}

impl Category for GroupField {
    const FORM: &'static str = "group";

    fn all() -> &'static [Self] {
        &[Self::Action, Self::Location, Self::Theme, Self::Camera, Self::Lighting]
    }

    fn id(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Location => "location",
            Self::Theme => "theme",
            Self::Camera => "camera",
            Self::Lighting => "lighting",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Location => "Location",
            Self::Theme => "Theme / Tone",
            Self::Camera => "Camera",
            Self::Lighting => "Lighting",
        }
    }

    fn cardinality(self) -> Cardinality {
        Cardinality::Single
    }

    fn options(self, catalog: &Catalog) -> &[String] {
        catalog.group.get(&self).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for CharacterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for MonsterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
