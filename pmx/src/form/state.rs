//! Form state - the user's selections, independent of any front end

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::FormError;
use super::category::{Cardinality, Category, CharacterField, MonsterField};
use crate::catalog::Catalog;
use crate::sentence::parse_custom_list;

/// Upper bound for the monster count spinner
pub const MAX_MONSTER_COUNT: u32 = 50;

/// What the user picked for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Structured options, kept in catalog order
    pub chosen: Vec<String>,
    /// Free-text "other" input, stored as typed
    pub other: String,
}

impl Selection {
    /// Free text wins over the dropdown when it is non-blank
    pub fn resolve_single(&self) -> Option<String> {
        let other = self.other.trim();
        if !other.is_empty() {
            return Some(other.to_string());
        }
        self.chosen.first().cloned()
    }

    /// Checked options followed by the free-text tokens
    pub fn resolve_multi(&self) -> Vec<String> {
        self.chosen
            .iter()
            .cloned()
            .chain(parse_custom_list(&self.other))
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// One edit to one category, as issued by the CLI flags or REPL commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Pick a dropdown option
    Choose(String),
    /// Replace the free-text input
    Other(String),
    /// Tick a checkbox
    Check(String),
    /// Untick a checkbox
    Uncheck(String),
    /// Drop choice and free text
    Unset,
}

/// Selections for one form, keyed by its category enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState<C: Category> {
    selections: BTreeMap<C, Selection>,
}

impl<C: Category> Default for FormState<C> {
    fn default() -> Self {
        Self {
            selections: BTreeMap::new(),
        }
    }
}

impl<C: Category> FormState<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the dropdown value of a single-select category
    ///
    /// Returns the canonical option text.
    pub fn choose(&mut self, category: C, value: &str, catalog: &Catalog) -> Result<String, FormError> {
        debug!(?category, %value, "FormState::choose: called");
        if category.cardinality() != Cardinality::Single {
            return Err(FormError::NotSingleSelect {
                category: category.label(),
            });
        }
        let canonical = find_option(category, value, catalog)?;
        self.selections.entry(category).or_default().chosen = vec![canonical.clone()];
        Ok(canonical)
    }

    /// Tick a checkbox of a multi-select category
    pub fn check(&mut self, category: C, option: &str, catalog: &Catalog) -> Result<String, FormError> {
        debug!(?category, %option, "FormState::check: called");
        if category.cardinality() != Cardinality::Multi {
            return Err(FormError::NotMultiSelect {
                category: category.label(),
            });
        }
        let canonical = find_option(category, option, catalog)?;
        let options = category.options(catalog);
        let selection = self.selections.entry(category).or_default();
        if !selection.chosen.contains(&canonical) {
            selection.chosen.push(canonical.clone());
            selection
                .chosen
                .sort_by_key(|o| options.iter().position(|x| x == o).unwrap_or(usize::MAX));
        }
        Ok(canonical)
    }

    /// Untick a checkbox; returns false if it was not ticked
    pub fn uncheck(&mut self, category: C, option: &str) -> bool {
        debug!(?category, %option, "FormState::uncheck: called");
        let Some(selection) = self.selections.get_mut(&category) else {
            return false;
        };
        let before = selection.chosen.len();
        selection.chosen.retain(|o| !o.eq_ignore_ascii_case(option.trim()));
        selection.chosen.len() != before
    }

    /// Replace the free-text input of any category
    pub fn set_other(&mut self, category: C, text: &str) {
        debug!(?category, text_len = text.len(), "FormState::set_other: called");
        self.selections.entry(category).or_default().other = text.to_string();
    }

    /// Drop both the structured choice and the free text of a category
    pub fn unset(&mut self, category: C) -> bool {
        debug!(?category, "FormState::unset: called");
        self.selections.remove(&category).is_some()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Apply a [`FieldEdit`]; returns false when it changed nothing
    pub fn apply(&mut self, category: C, edit: &FieldEdit, catalog: &Catalog) -> Result<bool, FormError> {
        match edit {
            FieldEdit::Choose(value) => self.choose(category, value, catalog).map(|_| true),
            FieldEdit::Other(text) => {
                self.set_other(category, text);
                Ok(true)
            }
            FieldEdit::Check(option) => self.check(category, option, catalog).map(|_| true),
            FieldEdit::Uncheck(option) => Ok(self.uncheck(category, option)),
            FieldEdit::Unset => Ok(self.unset(category)),
        }
    }

    pub fn selection(&self, category: C) -> Option<&Selection> {
        self.selections.get(&category)
    }

    /// Resolved value of a single-select category
    pub fn single(&self, category: C) -> Option<String> {
        self.selections.get(&category).and_then(Selection::resolve_single)
    }

    /// Resolved values of a multi-select category
    pub fn multi(&self, category: C) -> Vec<String> {
        self.selections
            .get(&category)
            .map(Selection::resolve_multi)
            .unwrap_or_default()
    }

    /// True when no category resolves to any content
    pub fn is_empty(&self) -> bool {
        C::all().iter().all(|&c| match c.cardinality() {
            Cardinality::Single => self.single(c).is_none(),
            Cardinality::Multi => self.multi(c).is_empty(),
        })
    }
}

fn find_option<C: Category>(category: C, value: &str, catalog: &Catalog) -> Result<String, FormError> {
    let wanted = value.trim();
    category
        .options(catalog)
        .iter()
        .find(|o| o.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| FormError::UnknownOption {
            category: category.label(),
            value: wanted.to_string(),
        })
}

fn resolve_style(name: &str, catalog: &Catalog) -> Result<String, FormError> {
    catalog
        .find_style(name)
        .map(|style| style.name.clone())
        .ok_or_else(|| FormError::UnknownStyle(name.trim().to_string()))
}

/// Character generator form
#[derive(Debug, Clone)]
pub struct CharacterForm {
    pub style: String,
    pub fields: FormState<CharacterField>,
    /// Gritty realism (no beauty retouching)
    pub gritty: bool,
}

impl CharacterForm {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            style: catalog.default_style().map(|s| s.name.clone()).unwrap_or_default(),
            fields: FormState::new(),
            gritty: true,
        }
    }

    pub fn set_style(&mut self, name: &str, catalog: &Catalog) -> Result<(), FormError> {
        self.style = resolve_style(name, catalog)?;
        Ok(())
    }
}

/// Monster generator form
#[derive(Debug, Clone)]
pub struct MonsterForm {
    pub style: String,
    pub fields: FormState<MonsterField>,
    count: u32,
    /// Render the whole count as a single horde scene
    pub horde: bool,
}

impl MonsterForm {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            style: catalog.default_style().map(|s| s.name.clone()).unwrap_or_default(),
            fields: FormState::new(),
            count: 1,
            horde: false,
        }
    }

    pub fn set_style(&mut self, name: &str, catalog: &Catalog) -> Result<(), FormError> {
        self.style = resolve_style(name, catalog)?;
        Ok(())
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Set the creature count, clamped to `1..=MAX_MONSTER_COUNT`
    pub fn set_count(&mut self, count: u32) -> u32 {
        self.count = count.clamp(1, MAX_MONSTER_COUNT);
        debug!(requested = count, count = self.count, "MonsterForm::set_count: called");
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    #[test]
    fn test_choose_canonicalizes_case() {
        let catalog = catalog();
        let mut form = FormState::<CharacterField>::new();
        let value = form.choose(CharacterField::Race, "dark elf", &catalog).unwrap();
        assert_eq!(value, "Dark Elf");
        assert_eq!(form.single(CharacterField::Race), Some("Dark Elf".to_string()));
    }

    #[test]
    fn test_choose_rejects_unknown_option() {
        let catalog = catalog();
        let mut form = FormState::<CharacterField>::new();
        let err = form.choose(CharacterField::Race, "Hobbit", &catalog).unwrap_err();
        assert!(matches!(err, FormError::UnknownOption { category: "Race", .. }));
    }

    #[test]
    fn test_cardinality_is_enforced() {
        let catalog = catalog();
        let mut form = FormState::<CharacterField>::new();
        assert!(matches!(
            form.choose(CharacterField::HeadHair, "Long Hair", &catalog),
            Err(FormError::NotSingleSelect { .. })
        ));
        assert!(matches!(
            form.check(CharacterField::Race, "Elf", &catalog),
            Err(FormError::NotMultiSelect { .. })
        ));
    }

    #[test]
    fn test_free_text_overrides_dropdown() {
        let catalog = catalog();
        let mut form = FormState::<CharacterField>::new();
        form.choose(CharacterField::RoleClass, "Ranger", &catalog).unwrap();
        form.set_other(CharacterField::RoleClass, "  Custom Ranger ");
        assert_eq!(form.single(CharacterField::RoleClass), Some("Custom Ranger".to_string()));

        form.set_other(CharacterField::RoleClass, "   ");
        assert_eq!(form.single(CharacterField::RoleClass), Some("Ranger".to_string()));
    }

    #[test]
    fn test_checked_options_follow_catalog_order() {
        let catalog = catalog();
        let mut form = FormState::<MonsterField>::new();
        form.check(MonsterField::Anatomy, "Wings", &catalog).unwrap();
        form.check(MonsterField::Anatomy, "claws", &catalog).unwrap();
        form.check(MonsterField::Anatomy, "Wings", &catalog).unwrap();
        form.set_other(MonsterField::Anatomy, "third eye; ; antlers");

        assert_eq!(
            form.multi(MonsterField::Anatomy),
            vec!["Claws", "Wings", "third eye", "antlers"]
        );

        assert!(form.uncheck(MonsterField::Anatomy, "CLAWS"));
        assert!(!form.uncheck(MonsterField::Anatomy, "Claws"));
        assert_eq!(form.multi(MonsterField::Anatomy), vec!["Wings", "third eye", "antlers"]);
    }

    #[test]
    fn test_is_empty_and_unset() {
        let catalog = catalog();
        let mut form = FormState::<CharacterField>::new();
        assert!(form.is_empty());

        form.set_other(CharacterField::Gender, "  ");
        assert!(form.is_empty());

        form.choose(CharacterField::Gender, "Female", &catalog).unwrap();
        assert!(!form.is_empty());
        assert!(form.unset(CharacterField::Gender));
        assert!(form.is_empty());
        assert!(!form.unset(CharacterField::Gender));
    }

    #[test]
    fn test_apply_edits() {
        let catalog = catalog();
        let mut form = FormState::<CharacterField>::new();
        assert!(form.apply(CharacterField::Race, &FieldEdit::Choose("orc".into()), &catalog).unwrap());
        assert!(form.apply(CharacterField::Accessories, &FieldEdit::Check("Lantern".into()), &catalog).unwrap());
        assert!(!form.apply(CharacterField::Accessories, &FieldEdit::Uncheck("Crown".into()), &catalog).unwrap());
        assert!(form.apply(CharacterField::Race, &FieldEdit::Unset, &catalog).unwrap());
        assert!(form.apply(CharacterField::Race, &FieldEdit::Check("Elf".into()), &catalog).is_err());
        assert_eq!(form.multi(CharacterField::Accessories), vec!["Lantern"]);
        assert!(form.single(CharacterField::Race).is_none());
    }

    #[test]
    fn test_monster_count_is_clamped() {
        let catalog = catalog();
        let mut form = MonsterForm::new(&catalog);
        assert_eq!(form.count(), 1);
        assert_eq!(form.set_count(0), 1);
        assert_eq!(form.set_count(12), 12);
        assert_eq!(form.set_count(500), MAX_MONSTER_COUNT);
    }

    #[test]
    fn test_style_resolution() {
        let catalog = catalog();
        let mut form = CharacterForm::new(&catalog);
        assert_eq!(form.style, "Dark Fantasy (B/W)");
        form.set_style("oil painting", &catalog).unwrap();
        assert_eq!(form.style, "Oil Painting");
        assert_eq!(
            form.set_style("Pixel Art", &catalog),
            Err(FormError::UnknownStyle("Pixel Art".to_string()))
        );
    }
}
