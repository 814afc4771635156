//! Group mixer - combines the roster into one group-scene prompt
//!
//! The mixer listens on the [`PromptBus`] and keeps the latest snapshot it
//! was handed. Composition renders the `group` template, trims every
//! non-blank line and joins them with single spaces.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use eyre::Result;
use serde::Serialize;
use tracing::debug;

use crate::bus::{ListenerId, PromptBus, RosterEntry};
use crate::catalog::Catalog;
use crate::form::{Category, FormError, GroupField};
use crate::prompts::PromptLoader;

/// Template rendered by [`compose_group_prompt`]
pub const GROUP_TEMPLATE: &str = "group";

/// Stands in for newlines inside entry text while lines are joined
const NEWLINE_MARK: char = '\u{1f}';

/// On/off scene cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneToggle {
    Conflict,
    Depth,
    Motion,
}

impl SceneToggle {
    pub const ALL: [SceneToggle; 3] = [Self::Conflict, Self::Depth, Self::Motion];

    pub fn id(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Depth => "depth",
            Self::Motion => "motion",
        }
    }
}

impl fmt::Display for SceneToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SceneToggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown toggle '{}' (expected conflict, depth or motion)", wanted))
    }
}

/// Scene-wide settings of the group form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneSettings {
    pub style: String,
    pub action: String,
    pub location: String,
    pub theme: String,
    pub camera: String,
    pub lighting: String,
    pub conflict: bool,
    pub depth: bool,
    pub motion: bool,
}

impl SceneSettings {
    pub fn new(catalog: &Catalog) -> Self {
        let first = |field: GroupField| field.options(catalog).first().cloned().unwrap_or_default();
        Self {
            style: catalog.last_style().map(|s| s.name.clone()).unwrap_or_default(),
            action: "Idle pose".to_string(),
            location: "Plain Dark Background".to_string(),
            theme: "Epic".to_string(),
            camera: first(GroupField::Camera),
            lighting: first(GroupField::Lighting),
            conflict: true,
            depth: true,
            motion: true,
        }
    }

    pub fn value(&self, field: GroupField) -> &str {
        match field {
            GroupField::Action => &self.action,
            GroupField::Location => &self.location,
            GroupField::Theme => &self.theme,
            GroupField::Camera => &self.camera,
            GroupField::Lighting => &self.lighting,
        }
    }

    /// Set a scene field to one of its catalog options; returns the canonical text
    pub fn set(&mut self, field: GroupField, value: &str, catalog: &Catalog) -> Result<String, FormError> {
        debug!(?field, %value, "SceneSettings::set: called");
        let wanted = value.trim();
        let canonical = field
            .options(catalog)
            .iter()
            .find(|o| o.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| FormError::UnknownOption {
                category: field.label(),
                value: wanted.to_string(),
            })?;
        let slot = match field {
            GroupField::Action => &mut self.action,
            GroupField::Location => &mut self.location,
            GroupField::Theme => &mut self.theme,
            GroupField::Camera => &mut self.camera,
            GroupField::Lighting => &mut self.lighting,
        };
        *slot = canonical.clone();
        Ok(canonical)
    }

    pub fn set_style(&mut self, name: &str, catalog: &Catalog) -> Result<(), FormError> {
        let style = catalog
            .find_style(name)
            .ok_or_else(|| FormError::UnknownStyle(name.trim().to_string()))?;
        self.style = style.name.clone();
        Ok(())
    }

    pub fn toggle(&self, toggle: SceneToggle) -> bool {
        match toggle {
            SceneToggle::Conflict => self.conflict,
            SceneToggle::Depth => self.depth,
            SceneToggle::Motion => self.motion,
        }
    }

    /// Set a toggle, or flip it when `on` is `None`; returns the new state
    pub fn set_toggle(&mut self, toggle: SceneToggle, on: Option<bool>) -> bool {
        let slot = match toggle {
            SceneToggle::Conflict => &mut self.conflict,
            SceneToggle::Depth => &mut self.depth,
            SceneToggle::Motion => &mut self.motion,
        };
        *slot = on.unwrap_or(!*slot);
        debug!(%toggle, state = *slot, "SceneSettings::set_toggle: called");
        *slot
    }
}

#[derive(Debug, Serialize)]
struct GroupContext<'a> {
    style_intro: &'a str,
    action: &'a str,
    location: &'a str,
    theme: String,
    camera: &'a str,
    lighting: &'a str,
    conflict: bool,
    depth: bool,
    motion: bool,
    individuals: Vec<Individual>,
}

#[derive(Debug, Serialize)]
struct Individual {
    position: String,
    role: &'static str,
    weight: u8,
    label: String,
    text: String,
}

fn fold_newlines(s: &str) -> String {
    s.chars().map(|c| if c == '\n' { NEWLINE_MARK } else { c }).collect()
}

/// Render the combined group prompt for `entries` in roster order
pub fn compose_group_prompt(
    settings: &SceneSettings,
    entries: &[RosterEntry],
    catalog: &Catalog,
    loader: &PromptLoader,
) -> Result<String> {
    debug!(entries = entries.len(), style = %settings.style, "compose_group_prompt: called");
    let context = GroupContext {
        style_intro: catalog.style_intro(&settings.style),
        action: &settings.action,
        location: &settings.location,
        theme: settings.theme.to_lowercase(),
        camera: &settings.camera,
        lighting: &settings.lighting,
        conflict: settings.conflict,
        depth: settings.depth,
        motion: settings.motion,
        individuals: entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Individual {
                position: format!("{:02}", i + 1),
                role: entry.kind.role(),
                weight: entry.weight.get(),
                label: fold_newlines(&entry.label),
                text: fold_newlines(&entry.text),
            })
            .collect(),
    };

    let rendered = loader.render(GROUP_TEMPLATE, &context)?;
    let text = rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(text.replace(NEWLINE_MARK, "\n"))
}

/// One listing line per entry, numbered from 01
pub fn roster_listing(entries: &[RosterEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry.listing_line(i + 1))
        .collect()
}

/// Consumer side of the bus
pub struct GroupMixer {
    pub settings: SceneSettings,
    roster: Rc<RefCell<Vec<RosterEntry>>>,
    listener: ListenerId,
}

impl GroupMixer {
    /// Register on `bus`; the current roster is delivered immediately
    pub fn attach(bus: &mut PromptBus, settings: SceneSettings) -> Self {
        debug!("GroupMixer::attach: called");
        let roster = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&roster);
        let listener = bus.register(move |entries| {
            *sink.borrow_mut() = entries;
        });
        Self {
            settings,
            roster,
            listener,
        }
    }

    /// Stop listening; the last snapshot stays readable
    pub fn detach(&self, bus: &mut PromptBus) -> bool {
        bus.unregister(self.listener)
    }

    /// Latest roster snapshot delivered by the bus
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.roster.borrow().clone()
    }

    pub fn listing(&self) -> Vec<String> {
        roster_listing(&self.roster.borrow())
    }

    pub fn compose(&self, catalog: &Catalog, loader: &PromptLoader) -> Result<String> {
        compose_group_prompt(&self.settings, &self.roster.borrow(), catalog, loader)
    }
}
