//! Sentence builder
//!
//! Pure functions from form state to prompt sentences. Empty categories are
//! skipped, multi-select values are joined with ", " inside one sentence,
//! and the final prompt is the sentences joined by a single space.

use serde::Serialize;
use tracing::debug;

use crate::bus::EntryKind;
use crate::catalog::Catalog;
use crate::form::{CharacterField, CharacterForm, MonsterField, MonsterForm};

/// Attractiveness levels that risk erasing racial features
const BEAUTIFIED_PREFIXES: &[&str] = &["Attractive", "Striking", "Ethereal"];

const GRITTY_LINE: &str = "Use gritty realism; avoid beauty portrait, glam makeup, and skin smoothing.";
const BEAUTY_GUARD_LINE: &str = "Avoid losing racial markers due to beautification.";
const MONSTER_SEPARATOR: &str = "\n\n---\n\n";

/// A composed prompt, ready to print, add to the roster or export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPrompt {
    pub kind: EntryKind,
    pub label: String,
    pub style: String,
    pub lines: Vec<String>,
    pub text: String,
}

/// Split free text on commas, semicolons and newlines into trimmed tokens
pub fn parse_custom_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

pub fn character_lines(form: &CharacterForm, catalog: &Catalog) -> Vec<String> {
    debug!(style = %form.style, "character_lines: called");
    let f = &form.fields;
    let mut lines = vec![catalog.style_intro(&form.style).to_string()];

    let race = f.single(CharacterField::Race);
    let subject: Vec<String> = [
        race.clone(),
        f.single(CharacterField::Gender),
        f.single(CharacterField::RoleClass),
    ]
    .into_iter()
    .flatten()
    .collect();
    if subject.is_empty() {
        lines.push("The subject is a character.".to_string());
    } else {
        lines.push(format!("The subject is a {}.", subject.join(" ")));
    }

    let preset = race.as_deref().and_then(|r| catalog.race_preset(r));
    if let Some(preset) = preset {
        lines.extend(preset.lines.iter().cloned());
    }

    let mut segments = Vec::new();
    if let Some(age) = f.single(CharacterField::Age) {
        segments.push(format!("approximately {}", age));
    }
    if let Some(expression) = f.single(CharacterField::FacialExpression) {
        segments.push(format!("with {}", expression));
    }
    if !segments.is_empty() {
        lines.push(format!("{}.", segments.join(", ")));
    }

    let mut body = Vec::new();
    if let Some(stature) = f.single(CharacterField::Stature) {
        body.push(format!("stature: {}", stature));
    }
    if let Some(build) = f.single(CharacterField::Build) {
        body.push(format!("build: {}", build));
    }
    if !body.is_empty() {
        lines.push(format!("Body: {}.", body.join(", ")));
    }

    if let Some(beauty) = f.single(CharacterField::Attractiveness) {
        lines.push(format!("Overall attractiveness: {}.", beauty));
        if BEAUTIFIED_PREFIXES.iter().any(|p| beauty.starts_with(p)) {
            lines.push(BEAUTY_GUARD_LINE.to_string());
        }
    }
    if form.gritty {
        lines.push(GRITTY_LINE.to_string());
    }

    push_list(&mut lines, "Head hair: ", &f.multi(CharacterField::HeadHair));
    push_list(&mut lines, "Facial hair: ", &f.multi(CharacterField::FacialHair));
    push_list(&mut lines, "Body hair: ", &f.multi(CharacterField::BodyHair));
    push_list(&mut lines, "Notable features include ", &f.multi(CharacterField::NotableTraits));

    let clothes = f.multi(CharacterField::ClothingArmor);
    let accessories = f.multi(CharacterField::Accessories);
    match (clothes.is_empty(), accessories.is_empty()) {
        (false, false) => lines.push(format!(
            "They wear {}, along with {}.",
            clothes.join(", "),
            accessories.join(", ")
        )),
        (false, true) => lines.push(format!("They wear {}.", clothes.join(", "))),
        (true, false) => lines.push(format!("They carry {}.", accessories.join(", "))),
        (true, true) => {}
    }

    if let Some(background) = f.single(CharacterField::Background) {
        lines.push(format!("The scene is set against a {} background.", background));
    }
    push_list(&mut lines, "Shown from ", &f.multi(CharacterField::Framing));

    if let Some(preset) = preset.filter(|p| !p.avoid.is_empty()) {
        lines.push(format!("Avoid: {}", preset.avoid));
    }
    lines
}

/// Race, gender and role joined by spaces, or "Character"
pub fn character_label(form: &CharacterForm) -> String {
    let parts: Vec<String> = [
        CharacterField::Race,
        CharacterField::Gender,
        CharacterField::RoleClass,
    ]
    .into_iter()
    .filter_map(|c| form.fields.single(c))
    .collect();
    if parts.is_empty() {
        EntryKind::Character.default_label().to_string()
    } else {
        parts.join(" ")
    }
}

pub fn character_prompt(form: &CharacterForm, catalog: &Catalog) -> RenderedPrompt {
    let lines = character_lines(form, catalog);
    let text = lines.join(" ");
    RenderedPrompt {
        kind: EntryKind::Character,
        label: character_label(form),
        style: form.style.clone(),
        lines,
        text,
    }
}

/// Sentences describing a single creature
pub fn monster_lines(form: &MonsterForm, catalog: &Catalog) -> Vec<String> {
    debug!(style = %form.style, "monster_lines: called");
    let f = &form.fields;
    let mut lines = vec![catalog.style_intro(&form.style).to_string()];

    let mut parts = Vec::new();
    parts.extend(f.single(MonsterField::CreatureType));
    parts.extend(f.single(MonsterField::Size));
    if let Some(biome) = f.single(MonsterField::Biome) {
        parts.push(format!("from a {} biome", biome));
    }
    if parts.is_empty() {
        lines.push("A monstrous creature.".to_string());
    } else {
        lines.push(format!("A monstrous creature: {}.", parts.join(", ")));
    }

    push_list(&mut lines, "Anatomy/features: ", &f.multi(MonsterField::Anatomy));
    push_list(&mut lines, "Surface/texture: ", &f.multi(MonsterField::Surface));
    if let Some(behavior) = f.single(MonsterField::Behavior) {
        lines.push(format!("Behavior: {}.", behavior));
    }
    push_list(&mut lines, "Abilities/attacks: ", &f.multi(MonsterField::Abilities));
    if let Some(threat) = f.single(MonsterField::ThreatLevel) {
        lines.push(format!("Overall threat level: {}.", threat));
    }
    if let Some(background) = f.single(MonsterField::Background) {
        lines.push(format!("Set against a {} background.", background));
    }
    push_list(&mut lines, "Shown from ", &f.multi(MonsterField::Framing));
    lines
}

/// "{type} ({size})" with the type defaulting to "Creature"
pub fn monster_label(form: &MonsterForm) -> String {
    let kind = form
        .fields
        .single(MonsterField::CreatureType)
        .unwrap_or_else(|| "Creature".to_string());
    match form.fields.single(MonsterField::Size) {
        Some(size) => format!("{} ({})", kind, size),
        None => kind,
    }
}

/// Compose the monster prompt, honoring count and horde mode
pub fn monster_prompt(form: &MonsterForm, catalog: &Catalog) -> RenderedPrompt {
    let count = form.count().max(1);
    let mut lines = monster_lines(form, catalog);
    let text = if form.horde && count > 1 {
        lines.push(format!(
            "Depict a horde of approximately {} creatures, with size and detail variation.",
            count
        ));
        lines.join(" ")
    } else {
        let base = lines.join(" ");
        (1..=count)
            .map(|i| format!("[Monster {}] {}", i, base))
            .collect::<Vec<_>>()
            .join(MONSTER_SEPARATOR)
    };
    debug!(count, horde = form.horde, text_len = text.len(), "monster_prompt: composed");
    RenderedPrompt {
        kind: EntryKind::Monster,
        label: monster_label(form),
        style: form.style.clone(),
        lines,
        text,
    }
}

fn push_list(lines: &mut Vec<String>, prefix: &str, values: &[String]) {
    if !values.is_empty() {
        lines.push(format!("{}{}.", prefix, values.join(", ")));
    }
}
