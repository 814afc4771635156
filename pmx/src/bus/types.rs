//! Roster entry types for the Prompt Bus

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default roster capacity
pub const MAX_ITEMS: usize = 12;

/// Lowest weight an entry can carry
pub const MIN_WEIGHT: u8 = 1;

/// Highest weight an entry can carry
pub const MAX_WEIGHT: u8 = 9;

/// Weight given to entries when the caller does not choose one
pub const DEFAULT_WEIGHT: u8 = 3;

/// Errors raised by roster operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Roster is full (max {max}).")]
    CapacityExceeded { max: usize },

    #[error("Weight {value} is out of range ({min}-{max})", min = MIN_WEIGHT, max = MAX_WEIGHT)]
    WeightOutOfRange { value: u8 },
}

/// Which producing form an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Character,
    Monster,
}

impl EntryKind {
    /// Four-letter tag used in roster listings
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Character => "CHAR",
            Self::Monster => "MONS",
        }
    }

    /// Role name used in the group prompt
    pub fn role(&self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Monster => "Monster",
        }
    }

    /// Label substituted when a producing form supplies an empty one
    pub fn default_label(&self) -> &'static str {
        self.role()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Monster => write!(f, "monster"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "character" | "char" => Ok(Self::Character),
            "monster" | "mons" => Ok(Self::Monster),
            other => Err(format!("Unknown entry kind: '{}'", other)),
        }
    }
}

/// Relative visual priority of an entry in the group prompt
///
/// Always within `MIN_WEIGHT..=MAX_WEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weight(u8);

impl Weight {
    pub fn new(value: u8) -> Result<Self, BusError> {
        if (MIN_WEIGHT..=MAX_WEIGHT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BusError::WeightOutOfRange { value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(DEFAULT_WEIGHT)
    }
}

impl TryFrom<u8> for Weight {
    type Error = BusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generated prompt held in the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub kind: EntryKind,
    pub label: String,
    pub text: String,
    pub weight: Weight,
}

impl RosterEntry {
    pub fn new(kind: EntryKind, label: impl Into<String>, text: impl Into<String>, weight: Weight) -> Self {
        Self {
            kind,
            label: label.into(),
            text: text.into(),
            weight,
        }
    }

    /// Roster listing line: `01 | CHAR | w3 | Elf Mage`
    pub fn listing_line(&self, position: usize) -> String {
        format!(
            "{:02} | {} | w{} | {}",
            position,
            self.kind.tag(),
            self.weight,
            self.label
        )
    }
}
