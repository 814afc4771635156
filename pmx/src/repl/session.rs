//! REPL session management

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use super::command::{PartyCommand, ReplCommand};
use crate::bus::{EntryKind, PromptBus, Weight};
use crate::catalog::Catalog;
use crate::cli::FormKind;
use crate::config::Config;
use crate::export::{default_export_path, export_prompt};
use crate::form::{
    Cardinality, Category, CharacterField, CharacterForm, FieldEdit, FormError, FormState, GroupField, MonsterField,
    MonsterForm,
};
use crate::group::{GroupMixer, SceneSettings, SceneToggle};
use crate::party::{PartyPrompt, PartySettings, Variation, party_prompt};
use crate::prompts::PromptLoader;
use crate::sentence::{RenderedPrompt, character_prompt, monster_prompt};

/// Result of handling one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashResult {
    Continue,
    Quit,
}

/// Interactive session: three forms sharing one prompt bus
///
/// Output goes to `out` so the session can be driven from tests.
pub struct ReplSession<W: Write> {
    out: W,
    catalog: Catalog,
    loader: PromptLoader,
    bus: PromptBus,
    mixer: GroupMixer,
    character: CharacterForm,
    monster: MonsterForm,
    tab: FormKind,
    last_character: Option<RenderedPrompt>,
    last_monster: Option<RenderedPrompt>,
    last_group: Option<String>,
    party: PartySettings,
    last_party: Option<PartyPrompt>,
    default_weight: Weight,
    export_dir: PathBuf,
}

impl<W: Write> ReplSession<W> {
    /// Create a new REPL session
    pub fn new(config: &Config, catalog: Catalog, loader: PromptLoader, out: W) -> Self {
        debug!(max_items = config.roster.max_items, "ReplSession::new: called");
        let mut bus = PromptBus::new(config.roster.max_items);
        let mixer = GroupMixer::attach(&mut bus, SceneSettings::new(&catalog));
        Self {
            out,
            character: CharacterForm::new(&catalog),
            monster: MonsterForm::new(&catalog),
            catalog,
            loader,
            bus,
            mixer,
            tab: FormKind::Character,
            last_character: None,
            last_monster: None,
            last_group: None,
            party: PartySettings::default(),
            last_party: None,
            default_weight: config.roster.weight(),
            export_dir: config.export.directory.clone(),
        }
    }

    pub fn tab(&self) -> FormKind {
        self.tab
    }

    pub fn bus(&self) -> &PromptBus {
        &self.bus
    }

    pub fn mixer(&self) -> &GroupMixer {
        &self.mixer
    }

    /// Consume the session and hand back its writer
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> Result<()> {
        self.print_welcome()?;

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{}{} ", self.tab.id().bright_cyan(), ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if self.handle_line(input)? == SlashResult::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    writeln!(self.out, "^C")?;
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    writeln!(self.out)?;
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        writeln!(self.out, "Goodbye!")?;
        Ok(())
    }

    /// Parse and execute one line; user mistakes are reported, not returned
    pub fn handle_line(&mut self, input: &str) -> Result<SlashResult> {
        debug!(%input, "ReplSession::handle_line: called");
        match input.parse::<ReplCommand>() {
            Ok(command) => self.execute(command),
            Err(message) => {
                writeln!(self.out, "{} {}", "?".yellow(), message)?;
                writeln!(self.out, "Type {} for available commands", "help".yellow())?;
                Ok(SlashResult::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: ReplCommand) -> Result<SlashResult> {
        debug!(?command, tab = %self.tab, "ReplSession::execute: called");
        let outcome = match command {
            ReplCommand::Quit => return Ok(SlashResult::Quit),
            ReplCommand::Help => self.print_help(),
            ReplCommand::Tab(tab) => {
                self.tab = tab;
                writeln!(self.out, "Switched to the {} tab.", tab.id().bright_cyan())?;
                Ok(())
            }
            ReplCommand::Style(name) => self.set_style(&name),
            ReplCommand::Field { category, edit } => self.edit_field(&category, &edit),
            ReplCommand::Reset => self.reset(),
            ReplCommand::Show => self.show(),
            ReplCommand::Options(category) => self.options(category.as_deref()),
            ReplCommand::Gritty(on) => {
                self.character.gritty = on.unwrap_or(!self.character.gritty);
                writeln!(self.out, "Gritty realism: {}", on_off(self.character.gritty))?;
                Ok(())
            }
            ReplCommand::Count(count) => {
                let count = self.monster.set_count(count);
                writeln!(self.out, "Monster count: {}", count)?;
                Ok(())
            }
            ReplCommand::Horde(on) => {
                self.monster.horde = on.unwrap_or(!self.monster.horde);
                writeln!(self.out, "Horde mode: {}", on_off(self.monster.horde))?;
                Ok(())
            }
            ReplCommand::Scene { field, value } => self.set_scene(&field, &value),
            ReplCommand::Toggle { toggle, on } => self.set_toggle(toggle, on),
            ReplCommand::Generate => self.generate(),
            ReplCommand::Add(weight) => self.add_to_group(weight),
            ReplCommand::Roster => self.print_roster(),
            ReplCommand::Up(position) => self.move_entry(position, true),
            ReplCommand::Down(position) => self.move_entry(position, false),
            ReplCommand::Remove(position) => self.remove(position),
            ReplCommand::Weight { position, weight } => self.set_weight(position, weight),
            ReplCommand::Clear => {
                self.bus.clear();
                writeln!(self.out, "{}", "Roster cleared.".dimmed())?;
                Ok(())
            }
            ReplCommand::Export(path) => self.export(path),
            ReplCommand::Party(command) => self.party(command),
        };

        if let Err(e) = outcome {
            warn!("Command failed: {}", e);
            writeln!(self.out, "{} {}", "!".red(), e)?;
        }
        Ok(SlashResult::Continue)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "promptmixer interactive session".bright_cyan().bold())?;
        writeln!(
            self.out,
            "Tabs: character, monster, group. Type {} for help, {} to quit",
            "help".yellow(),
            "quit".yellow()
        )?;
        writeln!(self.out)?;
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        let rows = [
            ("tab <form>", "Switch to the character, monster or group tab"),
            ("style <name>", "Render style of the active tab"),
            ("set <cat> <value>", "Pick a dropdown option (group tab: scene field)"),
            ("other <cat> [text]", "Free text for a category; empty clears it"),
            ("check <cat> <opt>", "Tick a checkbox option"),
            ("uncheck <cat> <opt>", "Untick a checkbox option"),
            ("unset <cat>", "Clear a category"),
            ("reset", "Reset the active form"),
            ("show", "Show the active form"),
            ("options [cat]", "List categories, or the options of one"),
            ("gritty [on|off]", "Character gritty realism"),
            ("count <n>", "Monster count (1-50)"),
            ("horde [on|off]", "Monster horde mode"),
            ("scene <field> <v>", "Group scene field (action, location, theme, camera, lighting)"),
            ("toggle <t> [on|off]", "Group cue: conflict, depth or motion"),
            ("generate", "Compose the prompt of the active tab"),
            ("add [weight]", "Add the last generated prompt to the roster"),
            ("roster", "List the roster"),
            ("up/down <pos>", "Move a roster entry"),
            ("remove <pos>", "Remove a roster entry"),
            ("weight <pos> <w>", "Set a roster entry weight (1-9)"),
            ("clear", "Empty the roster"),
            ("export [path]", "Write the last prompt of the active tab to a .txt file"),
            ("party", "Generate a party from the character form"),
            ("party members <n>", "Party size (2-20)"),
            ("party seed [s|off]", "Seed for reproducible variations"),
            ("party vary <v> [on|off]", "Re-roll a category per member"),
            ("party separate|scene", "Per-member prompts / team scene prompt"),
            ("party note <text>", "Notes for the next member (clear-notes to reset)"),
            ("party show|export", "Show party settings, or export the last party"),
            ("quit", "Exit"),
        ];
        writeln!(self.out)?;
        writeln!(self.out, "{}", "Available Commands:".bright_cyan())?;
        for (usage, about) in rows {
            writeln!(self.out, "  {:22} {}", usage.yellow(), about)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn set_style(&mut self, name: &str) -> Result<()> {
        let catalog = &self.catalog;
        match self.tab {
            FormKind::Character => self.character.set_style(name, catalog)?,
            FormKind::Monster => self.monster.set_style(name, catalog)?,
            FormKind::Group => self.mixer.settings.set_style(name, catalog)?,
        }
        let style = match self.tab {
            FormKind::Character => &self.character.style,
            FormKind::Monster => &self.monster.style,
            FormKind::Group => &self.mixer.settings.style,
        };
        writeln!(self.out, "Style: {}", style.bright_white())?;
        Ok(())
    }

    fn edit_field(&mut self, category: &str, edit: &FieldEdit) -> Result<()> {
        let changed = match self.tab {
            FormKind::Character => apply_edit(&mut self.character.fields, category, edit, &self.catalog)?,
            FormKind::Monster => apply_edit(&mut self.monster.fields, category, edit, &self.catalog)?,
            FormKind::Group => match edit {
                FieldEdit::Choose(value) => return self.set_scene(category, value),
                _ => return Err(eyre::eyre!("The group tab only supports 'set' and 'scene'")),
            },
        };
        if changed {
            writeln!(self.out, "{}", "Updated.".dimmed())?;
        } else {
            writeln!(self.out, "{}", "Nothing to change.".dimmed())?;
        }
        Ok(())
    }

    fn set_scene(&mut self, field: &str, value: &str) -> Result<()> {
        let field = GroupField::parse(field)?;
        let value = self.mixer.settings.set(field, value, &self.catalog)?;
        writeln!(self.out, "{}: {}", field.label(), value)?;
        Ok(())
    }

    fn set_toggle(&mut self, toggle: SceneToggle, on: Option<bool>) -> Result<()> {
        let state = self.mixer.settings.set_toggle(toggle, on);
        writeln!(self.out, "{}: {}", toggle, on_off(state))?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        match self.tab {
            FormKind::Character => {
                self.character = CharacterForm::new(&self.catalog);
                self.last_character = None;
            }
            FormKind::Monster => {
                self.monster = MonsterForm::new(&self.catalog);
                self.last_monster = None;
            }
            FormKind::Group => {
                self.mixer.settings = SceneSettings::new(&self.catalog);
                self.last_group = None;
            }
        }
        info!(tab = %self.tab, "Form reset");
        writeln!(self.out, "{}", "Form reset.".dimmed())?;
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        writeln!(self.out)?;
        match self.tab {
            FormKind::Character => {
                writeln!(self.out, "{} {}", "Style:".bright_cyan(), self.character.style)?;
                let lines = describe_form(&self.character.fields);
                if self.character.fields.is_empty() {
                    writeln!(self.out, "  {}", "(no selections)".dimmed())?;
                }
                self.write_lines(&lines)?;
                writeln!(self.out, "{} {}", "Gritty realism:".bright_cyan(), on_off(self.character.gritty))?;
            }
            FormKind::Monster => {
                writeln!(self.out, "{} {}", "Style:".bright_cyan(), self.monster.style)?;
                let lines = describe_form(&self.monster.fields);
                if self.monster.fields.is_empty() {
                    writeln!(self.out, "  {}", "(no selections)".dimmed())?;
                }
                self.write_lines(&lines)?;
                writeln!(self.out, "{} {}", "Count:".bright_cyan(), self.monster.count())?;
                writeln!(self.out, "{} {}", "Horde:".bright_cyan(), on_off(self.monster.horde))?;
            }
            FormKind::Group => {
                let settings = self.mixer.settings.clone();
                writeln!(self.out, "{} {}", "Style:".bright_cyan(), settings.style)?;
                for &field in GroupField::all() {
                    writeln!(self.out, "  {}: {}", field.label(), settings.value(field))?;
                }
                for toggle in SceneToggle::ALL {
                    writeln!(self.out, "  {}: {}", toggle, on_off(settings.toggle(toggle)))?;
                }
                self.print_roster()?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn options(&mut self, category: Option<&str>) -> Result<()> {
        let lines = match (self.tab, category) {
            (FormKind::Character, None) => list_categories::<CharacterField>(),
            (FormKind::Monster, None) => list_categories::<MonsterField>(),
            (FormKind::Group, None) => list_categories::<GroupField>(),
            (FormKind::Character, Some(name)) => {
                let mut lines = list_options::<CharacterField>(name, &self.catalog)?;
                if CharacterField::parse(name)? == CharacterField::Race {
                    let races: Vec<&str> = self.catalog.race_names().collect();
                    lines.push(format!("(presets: {})", races.join(", ")));
                }
                lines
            }
            (FormKind::Monster, Some(name)) => list_options::<MonsterField>(name, &self.catalog)?,
            (FormKind::Group, Some(name)) => list_options::<GroupField>(name, &self.catalog)?,
        };
        self.write_lines(&lines)
    }

    fn generate(&mut self) -> Result<()> {
        let text = match self.tab {
            FormKind::Character => {
                let prompt = character_prompt(&self.character, &self.catalog);
                let text = prompt.text.clone();
                self.last_character = Some(prompt);
                text
            }
            FormKind::Monster => {
                let prompt = monster_prompt(&self.monster, &self.catalog);
                let text = prompt.text.clone();
                self.last_monster = Some(prompt);
                text
            }
            FormKind::Group => {
                let text = self.mixer.compose(&self.catalog, &self.loader)?;
                self.last_group = Some(text.clone());
                text
            }
        };
        writeln!(self.out)?;
        writeln!(self.out, "{}", text)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn add_to_group(&mut self, weight: Option<u8>) -> Result<()> {
        let weight = match weight {
            Some(w) => Weight::new(w)?,
            None => self.default_weight,
        };
        let prompt = match self.tab {
            FormKind::Character => self.last_character.as_ref(),
            FormKind::Monster => self.last_monster.as_ref(),
            FormKind::Group => {
                return Err(eyre::eyre!("Switch to the character or monster tab to add entries"));
            }
        };
        let prompt = prompt
            .filter(|p| !p.text.trim().is_empty())
            .ok_or_else(|| FormError::InvalidSelection(format!("Generate a {} prompt first.", self.tab)))?;

        match prompt.kind {
            EntryKind::Character => self.bus.add_character(&prompt.label, prompt.text.clone(), weight)?,
            EntryKind::Monster => self.bus.add_monster(&prompt.label, prompt.text.clone(), weight)?,
        }
        writeln!(
            self.out,
            "{} {} added to the group ({}/{}).",
            "+".green(),
            prompt.label.clone().bright_white(),
            self.bus.len(),
            self.bus.capacity()
        )?;
        if self.bus.is_full() {
            writeln!(self.out, "{}", "Roster is now full.".dimmed())?;
        }
        Ok(())
    }

    fn print_roster(&mut self) -> Result<()> {
        let listing = self.mixer.listing();
        if listing.is_empty() {
            writeln!(self.out, "{}", "Roster is empty.".dimmed())?;
            return Ok(());
        }
        writeln!(
            self.out,
            "{}",
            format!("Roster ({}/{}):", listing.len(), self.bus.capacity()).bright_cyan()
        )?;
        self.write_lines(&listing)
    }

    fn move_entry(&mut self, position: usize, up: bool) -> Result<()> {
        let moved = match to_index(position) {
            Some(index) if up => self.bus.move_up(index),
            Some(index) => self.bus.move_down(index),
            None => false,
        };
        if !moved {
            writeln!(self.out, "{}", format!("Cannot move entry {}.", position).dimmed())?;
            return Ok(());
        }
        self.print_roster()
    }

    fn remove(&mut self, position: usize) -> Result<()> {
        match to_index(position).and_then(|index| self.bus.remove(index)) {
            Some(entry) => {
                writeln!(self.out, "{} Removed {}.", "-".red(), entry.label)?;
                self.print_roster()
            }
            None => {
                writeln!(self.out, "{}", format!("No entry at position {}.", position).dimmed())?;
                Ok(())
            }
        }
    }

    fn set_weight(&mut self, position: usize, weight: u8) -> Result<()> {
        let weight = Weight::new(weight)?;
        let updated = to_index(position).is_some_and(|index| self.bus.set_weight(index, weight));
        if !updated {
            writeln!(self.out, "{}", format!("No entry at position {}.", position).dimmed())?;
            return Ok(());
        }
        self.print_roster()
    }

    fn export(&mut self, path: Option<PathBuf>) -> Result<()> {
        let text = match self.tab {
            FormKind::Character => self.last_character.as_ref().map(|p| p.text.clone()),
            FormKind::Monster => self.last_monster.as_ref().map(|p| p.text.clone()),
            FormKind::Group => self.last_group.clone(),
        }
        .unwrap_or_default();
        let path = path.unwrap_or_else(|| default_export_path(&self.export_dir, self.tab.id(), Local::now()));
        let written = export_prompt(&path, &text)?;
        writeln!(self.out, "Saved to: {}", written.display().to_string().bright_white())?;
        Ok(())
    }

    fn party(&mut self, command: PartyCommand) -> Result<()> {
        debug!(?command, "ReplSession::party: called");
        match command {
            PartyCommand::Generate => {
                let party = party_prompt(&self.character, &self.catalog, &self.party);
                writeln!(self.out)?;
                writeln!(self.out, "{}", party.text)?;
                writeln!(self.out)?;
                self.last_party = Some(party);
            }
            PartyCommand::Show => self.show_party()?,
            PartyCommand::Members(members) => {
                let members = self.party.set_members(members);
                writeln!(self.out, "Party members: {}", members)?;
            }
            PartyCommand::Seed(seed) => {
                self.party.set_seed(seed.as_deref());
                writeln!(self.out, "Party seed: {}", self.party.seed().unwrap_or("(random)"))?;
            }
            PartyCommand::Vary { variation, on } => {
                let state = self.party.set_variation(variation, on);
                writeln!(self.out, "Vary {}: {}", variation, on_off(state))?;
            }
            PartyCommand::Separate(on) => {
                self.party.separate = on.unwrap_or(!self.party.separate);
                writeln!(self.out, "Separate prompts: {}", on_off(self.party.separate))?;
            }
            PartyCommand::Scene(on) => {
                self.party.team_scene = on.unwrap_or(!self.party.team_scene);
                writeln!(self.out, "Team scene: {}", on_off(self.party.team_scene))?;
            }
            PartyCommand::Note(note) => {
                self.party.add_note(&note);
                writeln!(self.out, "Note {} recorded.", self.party.notes.len())?;
            }
            PartyCommand::ClearNotes => {
                self.party.notes.clear();
                writeln!(self.out, "{}", "Party notes cleared.".dimmed())?;
            }
            PartyCommand::Export(path) => {
                let text = self.last_party.as_ref().map(|p| p.text.clone()).unwrap_or_default();
                let path = path.unwrap_or_else(|| default_export_path(&self.export_dir, "party", Local::now()));
                let written = export_prompt(&path, &text)?;
                writeln!(self.out, "Saved to: {}", written.display().to_string().bright_white())?;
            }
        }
        Ok(())
    }

    fn show_party(&mut self) -> Result<()> {
        let varied: Vec<&str> = Variation::ALL
            .into_iter()
            .filter(|v| self.party.variations.contains(v))
            .map(Variation::id)
            .collect();
        let varied = if varied.is_empty() { "none".to_string() } else { varied.join(", ") };
        writeln!(self.out)?;
        writeln!(self.out, "{} {}", "Members:".bright_cyan(), self.party.members())?;
        writeln!(self.out, "{} {}", "Seed:".bright_cyan(), self.party.seed().unwrap_or("(random)"))?;
        writeln!(self.out, "{} {}", "Vary:".bright_cyan(), varied)?;
        writeln!(self.out, "{} {}", "Separate prompts:".bright_cyan(), on_off(self.party.separate))?;
        writeln!(self.out, "{} {}", "Team scene:".bright_cyan(), on_off(self.party.team_scene))?;
        let notes: Vec<String> = self
            .party
            .notes
            .iter()
            .enumerate()
            .map(|(i, note)| format!("{}. {}", i + 1, note))
            .collect();
        self.write_lines(&notes)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "  {}", line)?;
        }
        Ok(())
    }
}

/// Run the interactive REPL
///
/// This is the main entry point for `pmx repl`.
pub fn run_interactive(config: &Config) -> Result<()> {
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let loader = PromptLoader::new(config.templates.resolve_dir().as_deref());
    let mut session = ReplSession::new(config, catalog, loader, std::io::stdout());
    session.run()
}

fn apply_edit<C: Category>(
    form: &mut FormState<C>,
    category: &str,
    edit: &FieldEdit,
    catalog: &Catalog,
) -> Result<bool, FormError> {
    let category = C::parse(category)?;
    form.apply(category, edit, catalog)
}

fn to_index(position: usize) -> Option<usize> {
    position.checked_sub(1)
}

fn on_off(state: bool) -> &'static str {
    if state { "on" } else { "off" }
}

fn describe_form<C: Category>(form: &FormState<C>) -> Vec<String> {
    C::all()
        .iter()
        .filter_map(|&category| {
            let selection = form.selection(category)?;
            let mut parts = selection.chosen.clone();
            if !selection.other.trim().is_empty() {
                parts.push(format!("other: \"{}\"", selection.other.trim()));
            }
            (!parts.is_empty()).then(|| format!("{}: {}", category.label(), parts.join(", ")))
        })
        .collect()
}

fn list_categories<C: Category>() -> Vec<String> {
    C::all()
        .iter()
        .map(|&c| {
            let kind = match c.cardinality() {
                Cardinality::Single => "one",
                Cardinality::Multi => "many",
            };
            format!("{:20} {:24} ({})", c.id(), c.label(), kind)
        })
        .collect()
}

fn list_options<C: Category>(name: &str, catalog: &Catalog) -> Result<Vec<String>, FormError> {
    let category = C::parse(name)?;
    Ok(category.options(catalog).to_vec())
}
