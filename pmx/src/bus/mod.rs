//! Prompt Bus - shared roster of generated prompts
//!
//! The bus is owned by the session and mutated only through its own
//! operations. Listeners are called synchronously after each change.

mod roster;
mod types;

pub use roster::{Listener, ListenerId, PromptBus};
pub use types::{BusError, DEFAULT_WEIGHT, EntryKind, MAX_ITEMS, MAX_WEIGHT, MIN_WEIGHT, RosterEntry, Weight};
