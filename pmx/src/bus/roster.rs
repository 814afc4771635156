//! Prompt Bus - ordered, bounded roster shared between forms
//!
//! Producing forms (character, monster) append entries. The group mixer
//! registers a listener and reorders, reweights and removes entries. Every
//! mutation is followed by a synchronous notification carrying a fresh
//! snapshot of the roster.

use std::fmt;

use tracing::{debug, info};

use super::types::{BusError, EntryKind, MAX_ITEMS, RosterEntry, Weight};

/// Observer callback, invoked with a copy of the roster after each change
pub type Listener = Box<dyn FnMut(Vec<RosterEntry>)>;

/// Handle returned by [`PromptBus::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered roster of generated prompts with observer notification
///
/// Listeners must not call back into the bus; they receive owned snapshots
/// and should only record or display them.
pub struct PromptBus {
    entries: Vec<RosterEntry>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    capacity: usize,
}

impl PromptBus {
    /// Create a bus holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "PromptBus::new: creating roster");
        Self {
            entries: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            capacity,
        }
    }

    /// Create a bus with the default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(MAX_ITEMS)
    }

    /// Register a listener and deliver the current roster to it immediately
    pub fn register(&mut self, listener: impl FnMut(Vec<RosterEntry>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        debug!(?id, "PromptBus::register: new listener");

        let snapshot = self.snapshot();
        self.listeners.push((id, Box::new(listener)));
        if let Some((_, listener)) = self.listeners.last_mut() {
            listener(snapshot);
        }
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        let removed = self.listeners.len() != before;
        debug!(?id, removed, "PromptBus::unregister: called");
        removed
    }

    /// Append an entry at the end of the roster
    pub fn add(
        &mut self,
        kind: EntryKind,
        label: impl Into<String>,
        text: impl Into<String>,
        weight: Weight,
    ) -> Result<(), BusError> {
        if self.entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "PromptBus::add: roster full");
            return Err(BusError::CapacityExceeded { max: self.capacity });
        }

        let entry = RosterEntry::new(kind, label, text, weight);
        info!(kind = %entry.kind, label = %entry.label, weight = %entry.weight, "Added roster entry");
        self.entries.push(entry);
        self.notify();
        Ok(())
    }

    /// Add a character entry, defaulting an empty label to "Character"
    pub fn add_character(&mut self, label: &str, text: impl Into<String>, weight: Weight) -> Result<(), BusError> {
        self.add_with_default_label(EntryKind::Character, label, text, weight)
    }

    /// Add a monster entry, defaulting an empty label to "Monster"
    pub fn add_monster(&mut self, label: &str, text: impl Into<String>, weight: Weight) -> Result<(), BusError> {
        self.add_with_default_label(EntryKind::Monster, label, text, weight)
    }

    fn add_with_default_label(
        &mut self,
        kind: EntryKind,
        label: &str,
        text: impl Into<String>,
        weight: Weight,
    ) -> Result<(), BusError> {
        let label = if label.trim().is_empty() {
            kind.default_label()
        } else {
            label
        };
        self.add(kind, label, text, weight)
    }

    /// Remove the entry at `index`; out-of-range indices are ignored
    pub fn remove(&mut self, index: usize) -> Option<RosterEntry> {
        if index >= self.entries.len() {
            debug!(index, len = self.entries.len(), "PromptBus::remove: stale index ignored");
            return None;
        }
        let entry = self.entries.remove(index);
        info!(index, label = %entry.label, "Removed roster entry");
        self.notify();
        Some(entry)
    }

    /// Swap the entry at `index` with its predecessor
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            debug!(index, len = self.entries.len(), "PromptBus::move_up: nothing to swap");
            return false;
        }
        self.entries.swap(index - 1, index);
        debug!(index, "PromptBus::move_up: swapped");
        self.notify();
        true
    }

    /// Swap the entry at `index` with its successor
    pub fn move_down(&mut self, index: usize) -> bool {
        if index >= self.entries.len().saturating_sub(1) {
            debug!(index, len = self.entries.len(), "PromptBus::move_down: nothing to swap");
            return false;
        }
        self.entries.swap(index, index + 1);
        debug!(index, "PromptBus::move_down: swapped");
        self.notify();
        true
    }

    /// Overwrite the weight of the entry at `index`
    pub fn set_weight(&mut self, index: usize, weight: Weight) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.weight = weight;
                debug!(index, %weight, "PromptBus::set_weight: updated");
                self.notify();
                true
            }
            None => {
                debug!(index, "PromptBus::set_weight: stale index ignored");
                false
            }
        }
    }

    /// Empty the roster
    pub fn clear(&mut self) {
        info!(count = self.entries.len(), "Cleared roster");
        self.entries.clear();
        self.notify();
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&RosterEntry> {
        self.entries.get(index)
    }

    /// Owned copy of the roster in order
    pub fn snapshot(&self) -> Vec<RosterEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        debug!(
            listeners = self.listeners.len(),
            entries = self.entries.len(),
            "PromptBus::notify"
        );
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(snapshot.clone());
        }
    }
}

impl Default for PromptBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl fmt::Debug for PromptBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptBus")
            .field("entries", &self.entries)
            .field("listeners", &self.listeners.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
