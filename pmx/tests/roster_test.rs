//! Integration tests for the Prompt Bus and group mixing
//!
//! Random operation sequences check the roster invariants; the scenario
//! tests drive forms, bus, mixer and export together.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use promptmixer::bus::{EntryKind, PromptBus, RosterEntry, Weight};
use promptmixer::catalog::Catalog;
use promptmixer::export::export_prompt;
use promptmixer::form::{CharacterField, CharacterForm, MonsterField, MonsterForm};
use promptmixer::group::{GroupMixer, SceneSettings};
use promptmixer::prompts::PromptLoader;
use promptmixer::sentence::{character_prompt, monster_prompt};
use tempfile::TempDir;

#[derive(Debug, Clone)]
enum Op {
    Add(bool),
    Remove(usize),
    Up(usize),
    Down(usize),
    SetWeight(usize, u8),
    Clear,
}

/// Mostly plausible positions, plus the extremes of the index range
fn index() -> impl Strategy<Value = usize> {
    prop_oneof![
        8 => 0usize..16,
        1 => Just(usize::MAX),
        1 => Just(usize::MAX - 1),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<bool>().prop_map(Op::Add),
        2 => index().prop_map(Op::Remove),
        2 => index().prop_map(Op::Up),
        2 => index().prop_map(Op::Down),
        2 => (index(), 1u8..=9).prop_map(|(i, w)| Op::SetWeight(i, w)),
        1 => Just(Op::Clear),
    ]
}

/// Plain Vec model of the roster
fn apply_model(model: &mut Vec<RosterEntry>, op: &Op, capacity: usize, serial: usize) {
    match *op {
        Op::Add(monster) => {
            if model.len() < capacity {
                let kind = if monster { EntryKind::Monster } else { EntryKind::Character };
                model.push(RosterEntry::new(kind, format!("e{}", serial), "text", Weight::default()));
            }
        }
        Op::Remove(i) => {
            if i < model.len() {
                model.remove(i);
            }
        }
        Op::Up(i) => {
            if i > 0 && i < model.len() {
                model.swap(i - 1, i);
            }
        }
        Op::Down(i) => {
            if i.checked_add(1).is_some_and(|next| next < model.len()) {
                model.swap(i, i + 1);
            }
        }
        Op::SetWeight(i, w) => {
            if let Some(entry) = model.get_mut(i) {
                entry.weight = Weight::new(w).unwrap();
            }
        }
        Op::Clear => model.clear(),
    }
}

fn apply_bus(bus: &mut PromptBus, op: &Op, serial: usize) {
    match *op {
        Op::Add(monster) => {
            let kind = if monster { EntryKind::Monster } else { EntryKind::Character };
            let _ = bus.add(kind, format!("e{}", serial), "text", Weight::default());
        }
        Op::Remove(i) => {
            bus.remove(i);
        }
        Op::Up(i) => {
            bus.move_up(i);
        }
        Op::Down(i) => {
            bus.move_down(i);
        }
        Op::SetWeight(i, w) => {
            bus.set_weight(i, Weight::new(w).unwrap());
        }
        Op::Clear => bus.clear(),
    }
}

proptest! {
    #[test]
    fn prop_bus_matches_model(ops in prop::collection::vec(op(), 0..64), capacity in 1usize..8) {
        let mut bus = PromptBus::new(capacity);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.register(move |entries| *sink.borrow_mut() = entries);

        let mut model = Vec::new();
        for (serial, op) in ops.iter().enumerate() {
            apply_model(&mut model, op, capacity, serial);
            apply_bus(&mut bus, op, serial);

            prop_assert!(bus.len() <= capacity);
            prop_assert_eq!(bus.entries(), model.as_slice());
            prop_assert!(bus.entries().iter().all(|e| (1..=9).contains(&e.weight.get())));
        }
        prop_assert_eq!(&*seen.borrow(), &model);
    }

    #[test]
    fn prop_full_bus_rejects_and_keeps_order(extra in 1usize..5) {
        let mut bus = PromptBus::with_default_capacity();
        for i in 0..bus.capacity() {
            bus.add_character(&format!("c{}", i), "t", Weight::default()).unwrap();
        }
        let before = bus.snapshot();
        for _ in 0..extra {
            let err = bus.add_monster("m", "t", Weight::default()).unwrap_err();
            prop_assert_eq!(err.to_string(), "Roster is full (max 12).");
        }
        prop_assert_eq!(bus.snapshot(), before);
    }
}

#[test]
fn test_forms_to_group_export() {
    let catalog = Catalog::embedded().unwrap();
    let loader = PromptLoader::embedded_only();
    let mut bus = PromptBus::with_default_capacity();
    let mixer = GroupMixer::attach(&mut bus, SceneSettings::new(&catalog));

    let mut hero = CharacterForm::new(&catalog);
    hero.fields.choose(CharacterField::Race, "Dwarf", &catalog).unwrap();
    hero.fields.choose(CharacterField::RoleClass, "Cleric", &catalog).unwrap();
    let hero = character_prompt(&hero, &catalog);
    bus.add_character(&hero.label, hero.text.clone(), Weight::new(5).unwrap()).unwrap();

    let mut beast = MonsterForm::new(&catalog);
    beast.fields.choose(MonsterField::CreatureType, "Dragon", &catalog).unwrap();
    beast.set_count(2);
    let beast = monster_prompt(&beast, &catalog);
    bus.add_monster(&beast.label, beast.text.clone(), Weight::default()).unwrap();

    bus.move_up(1);
    let text = mixer.compose(&catalog, &loader).unwrap();

    let dragon = text.find("01. [Monster] weight 3 — Dragon.").unwrap();
    let dwarf = text.find("02. [Character] weight 5 — Dwarf Cleric.").unwrap();
    assert!(dragon < dwarf);
    assert!(text.contains(&format!("[Dwarf Cleric] {}", hero.text)));
    assert!(text.contains(&format!("[Dragon] {}", beast.text)));

    let temp = TempDir::new().unwrap();
    let written = export_prompt(temp.path().join("group"), &text).unwrap();
    assert_eq!(std::fs::read_to_string(written).unwrap(), text);
}

#[test]
fn test_weight_change_reaches_mixer() {
    let catalog = Catalog::embedded().unwrap();
    let mut bus = PromptBus::with_default_capacity();
    let mixer = GroupMixer::attach(&mut bus, SceneSettings::new(&catalog));

    bus.add_character("", "a", Weight::default()).unwrap();
    assert!(bus.set_weight(0, Weight::new(8).unwrap()));
    assert!(!bus.set_weight(4, Weight::new(2).unwrap()));

    assert_eq!(mixer.listing(), vec!["01 | CHAR | w8 | Character"]);
}
