//! promptmixer - image prompt composer
//!
//! CLI entry point for one-shot prompts and the interactive session.

use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use promptmixer::catalog::Catalog;
use promptmixer::cli::{
    CharacterArgs, Cli, Command, FormKind, MonsterArgs, OutputArgs, OutputFormat, PartyArgs, generate_after_help,
};
use promptmixer::config::Config;
use promptmixer::export::export_prompt;
use promptmixer::form::{Cardinality, Category, CharacterField, CharacterForm, GroupField, MonsterField, MonsterForm};
use promptmixer::party::party_prompt;
use promptmixer::repl;
use promptmixer::sentence::{character_prompt, monster_prompt};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptmixer")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("promptmixer.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Character(args)) => cmd_character(&config, &args),
        Some(Command::Monster(args)) => cmd_monster(&config, &args),
        Some(Command::Party(args)) => cmd_party(&config, &args),
        Some(Command::Styles) => cmd_styles(&config),
        Some(Command::Options { form, category }) => cmd_options(&config, form, category.as_deref()),
        Some(Command::Repl) | None => {
            debug!("main: launching interactive session");
            repl::run_interactive(&config)
        }
    }
}

/// Compose a character prompt from flags
fn cmd_character(config: &Config, args: &CharacterArgs) -> Result<()> {
    debug!(?args, "cmd_character: called");
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let mut form = CharacterForm::new(&catalog);
    if let Some(style) = &args.fields.style {
        form.set_style(style, &catalog)?;
    }
    args.fields.apply_to(&mut form.fields, &catalog)?;
    form.gritty = !args.no_gritty;

    let prompt = character_prompt(&form, &catalog);
    emit(&prompt, &prompt.text, &args.output)
}

/// Compose a monster prompt from flags
fn cmd_monster(config: &Config, args: &MonsterArgs) -> Result<()> {
    debug!(?args, "cmd_monster: called");
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let mut form = MonsterForm::new(&catalog);
    if let Some(style) = &args.fields.style {
        form.set_style(style, &catalog)?;
    }
    args.fields.apply_to(&mut form.fields, &catalog)?;
    form.set_count(args.count);
    form.horde = args.horde;

    let prompt = monster_prompt(&form, &catalog);
    emit(&prompt, &prompt.text, &args.output)
}

/// Generate a party from a character profile
fn cmd_party(config: &Config, args: &PartyArgs) -> Result<()> {
    debug!(?args, "cmd_party: called");
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let mut form = CharacterForm::new(&catalog);
    if let Some(style) = &args.fields.style {
        form.set_style(style, &catalog)?;
    }
    args.fields.apply_to(&mut form.fields, &catalog)?;
    form.gritty = !args.no_gritty;

    let party = party_prompt(&form, &catalog, &args.settings());
    emit(&party, &party.text, &args.output)
}

fn emit<T: Serialize>(prompt: &T, text: &str, output: &OutputArgs) -> Result<()> {
    match output.format {
        OutputFormat::Text => println!("{}", text),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(prompt).context("Failed to serialize prompt")?;
            println!("{}", json);
        }
    }
    if let Some(path) = &output.export {
        let written = export_prompt(path, text)?;
        eprintln!("Saved to: {}", written.display());
    }
    Ok(())
}

/// List render styles
fn cmd_styles(config: &Config) -> Result<()> {
    debug!("cmd_styles: called");
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    for style in catalog.styles() {
        println!("{}", style.name.bold());
        println!("  {}", style.intro.dimmed());
    }
    Ok(())
}

/// List the categories of a form, or the options of one category
fn cmd_options(config: &Config, form: FormKind, category: Option<&str>) -> Result<()> {
    debug!(%form, ?category, "cmd_options: called");
    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    match form {
        FormKind::Character => {
            print_options::<CharacterField>(&catalog, category)?;
            if category.map(CharacterField::parse).transpose()? == Some(CharacterField::Race) {
                let races: Vec<&str> = catalog.race_names().collect();
                println!();
                println!("{} {}", "Races with presets:".dimmed(), races.join(", "));
            }
            Ok(())
        }
        FormKind::Monster => print_options::<MonsterField>(&catalog, category),
        FormKind::Group => print_options::<GroupField>(&catalog, category),
    }
}

fn print_options<C: Category>(catalog: &Catalog, category: Option<&str>) -> Result<()> {
    match category {
        Some(name) => {
            let category = C::parse(name)?;
            for option in category.options(catalog) {
                println!("{}", option);
            }
        }
        None => {
            for &category in C::all() {
                let kind = match category.cardinality() {
                    Cardinality::Single => "one",
                    Cardinality::Multi => "many",
                };
                println!("{:20} {:24} ({})", category.id().yellow(), category.label(), kind);
            }
        }
    }
    Ok(())
}
