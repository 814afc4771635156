//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use eyre::{Result, eyre};
use std::path::PathBuf;
use tracing::debug;

use crate::catalog::Catalog;
use crate::form::{Category, FieldEdit, FormState};
use crate::party::{DEFAULT_MEMBERS, PartySettings, Variation};

/// promptmixer - image prompt composer
#[derive(Parser)]
#[command(
    name = "pmx",
    about = "Compose image-generation prompts and mix them into group scenes",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compose a character prompt
    Character(CharacterArgs),

    /// Compose a monster prompt
    Monster(MonsterArgs),

    /// Generate a party of varied members from one character profile
    Party(PartyArgs),

    /// List render styles
    Styles,

    /// List the categories of a form, or the options of one category
    Options {
        /// Form to inspect (character, monster, group)
        form: FormKind,

        /// Category identifier or label
        category: Option<String>,
    },

    /// Interactive session with the group roster (default)
    Repl,
}

/// Category edits shared by the character and monster commands
#[derive(Debug, Default, Args)]
pub struct FieldArgs {
    /// Render style name
    #[arg(short, long)]
    pub style: Option<String>,

    /// Pick a dropdown option
    #[arg(long = "set", value_name = "CATEGORY=VALUE")]
    pub set: Vec<String>,

    /// Free text for a category; overrides the dropdown
    #[arg(long = "other", value_name = "CATEGORY=TEXT")]
    pub other: Vec<String>,

    /// Tick a checkbox option
    #[arg(long = "check", value_name = "CATEGORY=OPTION")]
    pub check: Vec<String>,
}

impl FieldArgs {
    /// Edits in application order: dropdowns, free text, then checkboxes
    pub fn edits(&self) -> Result<Vec<(String, FieldEdit)>> {
        let mut edits = Vec::new();
        for raw in &self.set {
            let (category, value) = split_assignment(raw)?;
            edits.push((category.to_string(), FieldEdit::Choose(value.to_string())));
        }
        for raw in &self.other {
            let (category, value) = split_assignment(raw)?;
            edits.push((category.to_string(), FieldEdit::Other(value.to_string())));
        }
        for raw in &self.check {
            let (category, value) = split_assignment(raw)?;
            edits.push((category.to_string(), FieldEdit::Check(value.to_string())));
        }
        Ok(edits)
    }

    pub fn apply_to<C: Category>(&self, form: &mut FormState<C>, catalog: &Catalog) -> Result<()> {
        debug!(form = C::FORM, "FieldArgs::apply_to: called");
        for (category, edit) in self.edits()? {
            let category = C::parse(&category)?;
            form.apply(category, &edit, catalog)?;
        }
        Ok(())
    }
}

/// Output options shared by the compose commands
#[derive(Debug, Default, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the prompt to this file (.txt added when missing)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CharacterArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Disable the gritty realism line
    #[arg(long)]
    pub no_gritty: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct MonsterArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Number of creatures (1-50)
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,

    /// Render the count as one horde scene
    #[arg(long)]
    pub horde: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct PartyArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Disable the gritty realism line
    #[arg(long)]
    pub no_gritty: bool,

    /// Number of members (2-20)
    #[arg(short = 'n', long, default_value_t = DEFAULT_MEMBERS)]
    pub members: u32,

    /// Seed for reproducible variations
    #[arg(long)]
    pub seed: Option<String>,

    /// Keep a variation category fixed across members (repeatable)
    #[arg(long = "fixed", value_name = "VARIATION")]
    pub fixed: Vec<Variation>,

    /// Skip the per-member prompts
    #[arg(long)]
    pub no_separate: bool,

    /// Add one prompt for the whole party
    #[arg(long)]
    pub team_scene: bool,

    /// Notes for the next member (repeatable, in member order)
    #[arg(long = "note", value_name = "TEXT")]
    pub notes: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl PartyArgs {
    pub fn settings(&self) -> PartySettings {
        let mut settings = PartySettings::default();
        settings.set_members(self.members);
        settings.set_seed(self.seed.as_deref());
        for variation in &self.fixed {
            settings.set_variation(*variation, Some(false));
        }
        settings.separate = !self.no_separate;
        settings.team_scene = self.team_scene;
        for note in &self.notes {
            settings.add_note(note);
        }
        settings
    }
}

/// Split `category=value` at the first '='
pub fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    let (category, value) = raw
        .split_once('=')
        .ok_or_else(|| eyre!("Expected CATEGORY=VALUE, got '{}'", raw))?;
    let category = category.trim();
    if category.is_empty() {
        return Err(eyre!("Missing category in '{}'", raw));
    }
    Ok((category, value.trim()))
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptmixer")
        .join("logs")
        .join("promptmixer.log")
}

/// Generate the after_help text
pub fn generate_after_help() -> String {
    let mut help = String::new();
    help.push_str("Run without a subcommand to start the interactive session.\n\n");
    help.push_str("Config is read from --config, ./.promptmixer.yml or ");
    match dirs::config_dir() {
        Some(dir) => help.push_str(&format!("{}\n", dir.join("promptmixer").join("promptmixer.yml").display())),
        None => help.push_str("~/.config/promptmixer/promptmixer.yml\n"),
    }
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Which form a command addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    Character,
    Monster,
    Group,
}

impl FormKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Monster => "monster",
            Self::Group => "group",
        }
    }
}

impl std::str::FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "character" | "char" => Ok(Self::Character),
            "monster" | "mons" => Ok(Self::Monster),
            "group" => Ok(Self::Group),
            _ => Err(format!("Unknown form: {}. Use: character, monster, or group", s)),
        }
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Output format for the compose commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::CharacterField;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["pmx"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_character() {
        let cli = Cli::parse_from([
            "pmx",
            "character",
            "--style",
            "Etching",
            "--set",
            "race=Elf",
            "--check",
            "accessories=Lantern",
            "--no-gritty",
            "--format",
            "json",
        ]);
        if let Some(Command::Character(args)) = cli.command {
            assert_eq!(args.fields.style.as_deref(), Some("Etching"));
            assert_eq!(args.fields.set, vec!["race=Elf"]);
            assert_eq!(args.fields.check, vec!["accessories=Lantern"]);
            assert!(args.no_gritty);
            assert_eq!(args.output.format, OutputFormat::Json);
            assert!(args.output.export.is_none());
        } else {
            panic!("Expected Character command");
        }
    }

    #[test]
    fn test_cli_parse_monster() {
        let cli = Cli::parse_from(["pmx", "monster", "-n", "8", "--horde", "-o", "out/horde"]);
        if let Some(Command::Monster(args)) = cli.command {
            assert_eq!(args.count, 8);
            assert!(args.horde);
            assert_eq!(args.output.export, Some(PathBuf::from("out/horde")));
        } else {
            panic!("Expected Monster command");
        }
    }

    #[test]
    fn test_cli_parse_party() {
        let cli = Cli::parse_from([
            "pmx",
            "party",
            "--set",
            "race=Dwarf",
            "-n",
            "30",
            "--seed",
            "iron",
            "--fixed",
            "build",
            "--fixed",
            "head-hair",
            "--team-scene",
            "--note",
            "Name: Kael",
        ]);
        if let Some(Command::Party(args)) = cli.command {
            let settings = args.settings();
            assert_eq!(settings.members(), 20);
            assert_eq!(settings.seed(), Some("iron"));
            assert!(!settings.variations.contains(&Variation::Build));
            assert!(!settings.variations.contains(&Variation::HeadHair));
            assert!(settings.variations.contains(&Variation::Stature));
            assert!(settings.separate);
            assert!(settings.team_scene);
            assert_eq!(settings.notes, vec!["Name: Kael"]);
        } else {
            panic!("Expected Party command");
        }
        assert!(Cli::try_parse_from(["pmx", "party", "--fixed", "wings"]).is_err());
    }

    #[test]
    fn test_cli_parse_options() {
        let cli = Cli::parse_from(["pmx", "options", "monster", "size"]);
        assert!(matches!(
            cli.command,
            Some(Command::Options {
                form: FormKind::Monster,
                category: Some(_)
            })
        ));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["pmx", "-c", "/path/to/config.yml", "styles"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert!(matches!(cli.command, Some(Command::Styles)));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("race = Dark Elf").unwrap(), ("race", "Dark Elf"));
        assert_eq!(split_assignment("notable-traits=a=b").unwrap(), ("notable-traits", "a=b"));
        assert!(split_assignment("race").is_err());
        assert!(split_assignment("=Elf").is_err());
    }

    #[test]
    fn test_field_args_apply() {
        let catalog = Catalog::embedded().unwrap();
        let args = FieldArgs {
            set: vec!["role-class=Ranger".to_string()],
            other: vec!["role-class=Custom Ranger".to_string()],
            check: vec!["Framing=Bust".to_string()],
            ..Default::default()
        };
        let mut form = FormState::<CharacterField>::new();
        args.apply_to(&mut form, &catalog).unwrap();
        assert_eq!(form.single(CharacterField::RoleClass).as_deref(), Some("Custom Ranger"));
        assert_eq!(form.multi(CharacterField::Framing), vec!["Bust"]);

        let bad = FieldArgs {
            set: vec!["wings=Large".to_string()],
            ..Default::default()
        };
        assert!(bad.apply_to(&mut form, &catalog).is_err());
    }
}
