//! Form state for the character, monster and group forms
//!
//! Each form is a typed map from a closed category enumeration to the
//! user's selection. Nothing here knows how selections are entered.

mod category;
mod state;

use thiserror::Error;

pub use category::{Cardinality, Category, CharacterField, GroupField, MonsterField};
pub use state::{CharacterForm, FieldEdit, FormState, MAX_MONSTER_COUNT, MonsterForm, Selection};

/// Errors from editing form state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Unknown {form} category: '{name}'")]
    UnknownCategory { form: &'static str, name: String },

    #[error("'{value}' is not an option for {category}")]
    UnknownOption { category: &'static str, value: String },

    #[error("{category} is a multi-select category; use check/uncheck")]
    NotSingleSelect { category: &'static str },

    #[error("{category} is a single-select category; use set")]
    NotMultiSelect { category: &'static str },

    #[error("Unknown render style: '{0}'")]
    UnknownStyle(String),

    /// Nothing has been composed yet for the requested action
    #[error("No prompt: {0}")]
    InvalidSelection(String),
}
