//! promptmixer - image-generation prompt composer
//!
//! Builds natural-language prompts from form selections (dropdowns,
//! checkboxes and free text) and collects them on a bounded roster, the
//! Prompt Bus, from which a group-scene prompt is mixed.
//!
//! # Modules
//!
//! - [`catalog`] - Render styles, option lists and race presets
//! - [`form`] - Form state for the character, monster and group forms
//! - [`sentence`] - Pure sentence builder
//! - [`bus`] - Prompt Bus roster with listener notification
//! - [`group`] - Group mixer and scene settings
//! - [`party`] - Seeded party generator built on the character form
//! - [`export`] - Plain-text export
//! - [`prompts`] - Handlebars template loading
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive session

pub mod bus;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod export;
pub mod form;
pub mod group;
pub mod party;
pub mod prompts;
pub mod repl;
pub mod sentence;

// Re-export commonly used types
pub use bus::{BusError, EntryKind, PromptBus, RosterEntry, Weight};
pub use catalog::{Catalog, CatalogError};
pub use config::Config;
pub use form::{CharacterForm, FormError, MonsterForm};
pub use group::{GroupMixer, SceneSettings};
pub use party::{PartyPrompt, PartySettings, Variation};
pub use sentence::RenderedPrompt;
