//! Party generator
//!
//! Expands one character profile into a party of members. Each member gets
//! the base sentences plus randomly drawn variation lines; a non-empty seed
//! makes the draw reproducible.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::form::{Category, CharacterField, CharacterForm};
use crate::sentence::character_lines;

pub const MIN_MEMBERS: u32 = 2;
pub const MAX_MEMBERS: u32 = 20;
pub const DEFAULT_MEMBERS: u32 = 4;

const PARTY_SEPARATOR: &str = "\n\n---\n\n";

/// A category that may be re-rolled per member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variation {
    Expression,
    HeadHair,
    FacialHair,
    Traits,
    Accessories,
    Stature,
    Build,
    Attractiveness,
}

impl Variation {
    /// Draw order; changing it changes every seeded party
    pub const ALL: [Variation; 8] = [
        Self::Expression,
        Self::HeadHair,
        Self::FacialHair,
        Self::Traits,
        Self::Accessories,
        Self::Stature,
        Self::Build,
        Self::Attractiveness,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::HeadHair => "head-hair",
            Self::FacialHair => "facial-hair",
            Self::Traits => "traits",
            Self::Accessories => "accessories",
            Self::Stature => "stature",
            Self::Build => "build",
            Self::Attractiveness => "attractiveness",
        }
    }

    /// Character category whose options feed the draw
    pub fn category(self) -> CharacterField {
        match self {
            Self::Expression => CharacterField::FacialExpression,
            Self::HeadHair => CharacterField::HeadHair,
            Self::FacialHair => CharacterField::FacialHair,
            Self::Traits => CharacterField::NotableTraits,
            Self::Accessories => CharacterField::Accessories,
            Self::Stature => CharacterField::Stature,
            Self::Build => CharacterField::Build,
            Self::Attractiveness => CharacterField::Attractiveness,
        }
    }

    fn line(self, value: &str) -> String {
        match self {
            Self::Expression => format!("Additional facial expression nuance: {}.", value),
            Self::HeadHair => format!("Head hair variation: {}.", value),
            Self::FacialHair => format!("Facial hair variation: {}.", value),
            Self::Traits => format!("Additional notable feature: {}.", value),
            Self::Accessories => format!("Additional prop/accessory: {}.", value),
            Self::Stature => format!("Body: stature override {}.", value),
            Self::Build => format!("Body: build override {}.", value),
            Self::Attractiveness => format!("Attractiveness override: {}.", value),
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Variation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.id() == wanted || v.category().id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|v| v.id()).collect();
                format!("Unknown variation: {}. Use: {}", s, known.join(", "))
            })
    }
}

/// Party parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartySettings {
    members: u32,
    /// One "[Character N]" prompt per member
    pub separate: bool,
    /// One "[Team Scene]" prompt for the whole party
    pub team_scene: bool,
    pub variations: BTreeSet<Variation>,
    seed: Option<String>,
    /// Per-member notes, in member order
    pub notes: Vec<String>,
}

impl Default for PartySettings {
    fn default() -> Self {
        Self {
            members: DEFAULT_MEMBERS,
            separate: true,
            team_scene: false,
            variations: Variation::ALL.into_iter().collect(),
            seed: None,
            notes: Vec::new(),
        }
    }
}

impl PartySettings {
    pub fn members(&self) -> u32 {
        self.members
    }

    /// Set the member count, clamped to `MIN_MEMBERS..=MAX_MEMBERS`
    pub fn set_members(&mut self, members: u32) -> u32 {
        self.members = members.clamp(MIN_MEMBERS, MAX_MEMBERS);
        debug!(requested = members, members = self.members, "PartySettings::set_members: called");
        self.members
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    /// Blank seeds mean "draw fresh every time"
    pub fn set_seed(&mut self, seed: Option<&str>) {
        self.seed = seed.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    }

    /// Enable, disable or flip one variation; returns the new state
    pub fn set_variation(&mut self, variation: Variation, on: Option<bool>) -> bool {
        let on = on.unwrap_or(!self.variations.contains(&variation));
        if on {
            self.variations.insert(variation);
        } else {
            self.variations.remove(&variation);
        }
        on
    }

    /// Add a note for the next member without one; blank notes are dropped
    pub fn add_note(&mut self, note: &str) -> bool {
        let note = note.trim();
        if note.is_empty() {
            return false;
        }
        self.notes.push(note.to_string());
        true
    }
}

/// A generated party, ready to print or export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyPrompt {
    pub style: String,
    pub seed: Option<String>,
    /// One prompt per member, without the "[Character N]" tag
    pub members: Vec<String>,
    pub text: String,
}

/// 64-bit FNV-1a, so a seed string maps to the same stream everywhere
fn seed_value(seed: &str) -> u64 {
    seed.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn party_rng(seed: Option<&str>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed_value(seed)),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Generate a party from the character form
pub fn party_prompt(form: &CharacterForm, catalog: &Catalog, settings: &PartySettings) -> PartyPrompt {
    debug!(
        members = settings.members,
        seed = ?settings.seed,
        variations = settings.variations.len(),
        "party_prompt: called"
    );
    let mut rng = party_rng(settings.seed());
    let base = character_lines(form, catalog);

    let members: Vec<String> = (0..settings.members as usize)
        .map(|i| {
            let mut lines = base.clone();
            for variation in Variation::ALL {
                if !settings.variations.contains(&variation) {
                    continue;
                }
                if let Some(value) = variation.category().options(catalog).choose(&mut rng) {
                    lines.push(variation.line(value));
                }
            }
            if let Some(note) = settings.notes.get(i).map(|n| n.trim()).filter(|n| !n.is_empty()) {
                lines.push(format!("Member-specific notes: {}.", note));
            }
            lines.join(" ")
        })
        .collect();

    let mut bundle = Vec::new();
    if settings.separate || !settings.team_scene {
        bundle.extend(
            members
                .iter()
                .enumerate()
                .map(|(i, member)| format!("[Character {}] {}", i + 1, member)),
        );
    }
    if settings.team_scene {
        let mut scene = base;
        scene.push(format!(
            "Group composition: {} adventurers standing together with varied heights and stances; coherent lighting and perspective.",
            settings.members
        ));
        bundle.push(format!("[Team Scene] {}", scene.join(" ")));
    }

    PartyPrompt {
        style: form.style.clone(),
        seed: settings.seed.clone(),
        members,
        text: bundle.join(PARTY_SEPARATOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn seeded(seed: &str) -> PartySettings {
        let mut settings = PartySettings::default();
        settings.set_seed(Some(seed));
        settings
    }

    #[test]
    fn test_same_seed_same_party() {
        let catalog = catalog();
        let mut form = CharacterForm::new(&catalog);
        form.fields.choose(CharacterField::Race, "Dwarf", &catalog).unwrap();

        let first = party_prompt(&form, &catalog, &seeded("iron-hills"));
        let second = party_prompt(&form, &catalog, &seeded("iron-hills"));
        assert_eq!(first, second);
        assert_eq!(first.members.len(), DEFAULT_MEMBERS as usize);
        assert_eq!(first.seed.as_deref(), Some("iron-hills"));
    }

    #[test]
    fn test_different_seeds_differ() {
        let catalog = catalog();
        let form = CharacterForm::new(&catalog);
        let mut a = seeded("alpha");
        let mut b = seeded("omega");
        a.set_members(MAX_MEMBERS);
        b.set_members(MAX_MEMBERS);
        assert_ne!(party_prompt(&form, &catalog, &a).text, party_prompt(&form, &catalog, &b).text);
    }

    #[test]
    fn test_seed_value_is_stable() {
        assert_eq!(seed_value(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(seed_value("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_member_lines() {
        let catalog = catalog();
        let form = CharacterForm::new(&catalog);
        let base = character_lines(&form, &catalog).join(" ");
        let party = party_prompt(&form, &catalog, &seeded("s"));

        for member in &party.members {
            assert!(member.starts_with(&base));
            assert!(member.contains("Additional facial expression nuance: "));
            assert!(member.contains("Attractiveness override: "));
        }
        let head = member_value(&party.members[0], "Head hair variation: ");
        assert!(CharacterField::HeadHair.options(&catalog).contains(&head));
    }

    fn member_value(member: &str, prefix: &str) -> String {
        let start = member.find(prefix).unwrap() + prefix.len();
        let rest = &member[start..];
        rest[..rest.find('.').unwrap()].to_string()
    }

    #[test]
    fn test_variations_can_be_disabled() {
        let catalog = catalog();
        let form = CharacterForm::new(&catalog);
        let mut settings = seeded("quiet");
        settings.variations.clear();
        let party = party_prompt(&form, &catalog, &settings);

        let base = character_lines(&form, &catalog).join(" ");
        assert!(party.members.iter().all(|m| *m == base));

        assert!(settings.set_variation(Variation::Build, None));
        assert!(!settings.set_variation(Variation::Build, Some(false)));
        assert!(settings.variations.is_empty());
    }

    #[test]
    fn test_notes_attach_in_order() {
        let catalog = catalog();
        let form = CharacterForm::new(&catalog);
        let mut settings = seeded("notes");
        settings.variations.clear();
        settings.set_members(3);
        assert!(settings.add_note("Name: Kael, Role: Ranger"));
        assert!(!settings.add_note("   "));
        assert!(settings.add_note("scar across eye"));

        let party = party_prompt(&form, &catalog, &settings);
        assert!(party.members[0].ends_with("Member-specific notes: Name: Kael, Role: Ranger."));
        assert!(party.members[1].ends_with("Member-specific notes: scar across eye."));
        assert!(!party.members[2].contains("Member-specific notes"));
    }

    #[test]
    fn test_bundle_modes() {
        let catalog = catalog();
        let form = CharacterForm::new(&catalog);
        let mut settings = seeded("bundle");
        settings.set_members(2);

        let text = party_prompt(&form, &catalog, &settings).text;
        let parts: Vec<&str> = text.split(PARTY_SEPARATOR).collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("[Character 1] "));
        assert!(parts[1].starts_with("[Character 2] "));

        settings.team_scene = true;
        let text = party_prompt(&form, &catalog, &settings).text;
        let parts: Vec<&str> = text.split(PARTY_SEPARATOR).collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[2].starts_with("[Team Scene] "));
        assert!(parts[2].ends_with(
            "Group composition: 2 adventurers standing together with varied heights and stances; \
             coherent lighting and perspective."
        ));

        settings.separate = false;
        let text = party_prompt(&form, &catalog, &settings).text;
        assert!(text.starts_with("[Team Scene] "));
        assert!(!text.contains(PARTY_SEPARATOR));

        // neither mode falls back to separate prompts
        settings.team_scene = false;
        let text = party_prompt(&form, &catalog, &settings).text;
        assert!(text.starts_with("[Character 1] "));
    }

    #[test]
    fn test_member_count_clamped() {
        let mut settings = PartySettings::default();
        assert_eq!(settings.set_members(1), MIN_MEMBERS);
        assert_eq!(settings.set_members(99), MAX_MEMBERS);
        assert_eq!(settings.set_members(7), 7);
    }

    #[test]
    fn test_blank_seed_is_unseeded() {
        let mut settings = PartySettings::default();
        settings.set_seed(Some("  "));
        assert_eq!(settings.seed(), None);
        settings.set_seed(Some(" 42 "));
        assert_eq!(settings.seed(), Some("42"));
    }

    #[test]
    fn test_variation_from_str() {
        assert_eq!("head-hair".parse::<Variation>(), Ok(Variation::HeadHair));
        assert_eq!("Notable-Traits".parse::<Variation>(), Ok(Variation::Traits));
        assert_eq!("facial-expression".parse::<Variation>(), Ok(Variation::Expression));
        assert!("wings".parse::<Variation>().is_err());
    }
}
