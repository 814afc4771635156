//! Vocabulary catalog
//!
//! Render styles, per-category option lists and race presets. The catalog
//! ships embedded in the binary and can be replaced by a YAML file with the
//! same layout:
//!
//! ```yaml
//! styles:
//!   - name: "Etching"
//!     intro: "A monochrome copperplate etching style with fine cross-hatching."
//! character:
//!   race: ["Elf", "Orc"]
//! monster:
//!   size: ["Small", "Large"]
//! group:
//!   action: ["Duel"]
//! races:
//!   Elf:
//!     lines: ["Long pointed ears clearly visible."]
//!     avoid: "Avoid human round ears."
//! ```

pub mod embedded;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::form::{Category, CharacterField, GroupField, MonsterField};

/// Errors from loading or validating a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Catalog has no render styles")]
    NoStyles,

    #[error("Catalog has no options for {form} category '{category}'")]
    MissingOptions { form: &'static str, category: &'static str },
}

/// A render style: display name plus the sentence that opens every prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub intro: String,
}

/// Extra description attached to a race choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacePreset {
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub avoid: String,
}

/// All static vocabulary used by the forms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub(crate) styles: Vec<Style>,
    #[serde(default)]
    pub(crate) character: BTreeMap<CharacterField, Vec<String>>,
    #[serde(default)]
    pub(crate) monster: BTreeMap<MonsterField, Vec<String>>,
    #[serde(default)]
    pub(crate) group: BTreeMap<GroupField, Vec<String>>,
    #[serde(default)]
    pub(crate) races: BTreeMap<String, RacePreset>,
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
        debug!(content_len = content.len(), "Catalog::from_yaml: called");
        let catalog: Self = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml(embedded::CATALOG)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!(?path, "Catalog::from_file: called");
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load the override file if one is configured, else the embedded catalog
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            debug!(?path, "Catalog::load: override configured");
            let catalog =
                Self::from_file(path).context(format!("Failed to load catalog from {}", path.display()))?;
            info!("Loaded catalog from: {}", path.display());
            return Ok(catalog);
        }
        debug!("Catalog::load: using embedded catalog");
        Ok(Self::embedded()?)
    }

    /// Every category of every form needs at least one option
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.styles.is_empty() {
            return Err(CatalogError::NoStyles);
        }
        check_options::<CharacterField>(self)?;
        check_options::<MonsterField>(self)?;
        check_options::<GroupField>(self)?;
        Ok(())
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Style preselected by the character and monster forms
    pub fn default_style(&self) -> Option<&Style> {
        self.styles.first()
    }

    /// Style preselected by the group mixer
    pub fn last_style(&self) -> Option<&Style> {
        self.styles.last()
    }

    pub fn find_style(&self, name: &str) -> Option<&Style> {
        let wanted = name.trim();
        self.styles.iter().find(|s| s.name.eq_ignore_ascii_case(wanted))
    }

    /// Intro sentence for a style; unknown names fall back to the first style
    pub fn style_intro(&self, name: &str) -> &str {
        self.find_style(name)
            .or_else(|| self.default_style())
            .map(|s| s.intro.as_str())
            .unwrap_or("")
    }

    pub fn race_preset(&self, race: &str) -> Option<&RacePreset> {
        self.races.get(race)
    }

    pub fn race_names(&self) -> impl Iterator<Item = &str> {
        self.races.keys().map(String::as_str)
    }
}

fn check_options<C: Category>(catalog: &Catalog) -> Result<(), CatalogError> {
    for &category in C::all() {
        if category.options(catalog).is_empty() {
            return Err(CatalogError::MissingOptions {
                form: C::FORM,
                category: category.id(),
            });
        }
    }
    Ok(())
}
