//! REPL command parsing
//!
//! Commands are whitespace-separated words; a leading '/' is accepted.
//! Roster positions are 1-based, as listed by `roster`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::FormKind;
use crate::form::FieldEdit;
use crate::group::SceneToggle;
use crate::party::Variation;

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Tab(FormKind),
    Style(String),
    /// Edit one category of the active form
    Field { category: String, edit: FieldEdit },
    Reset,
    Show,
    Options(Option<String>),
    Gritty(Option<bool>),
    Count(u32),
    Horde(Option<bool>),
    Scene { field: String, value: String },
    Toggle { toggle: SceneToggle, on: Option<bool> },
    Generate,
    Add(Option<u8>),
    Roster,
    Up(usize),
    Down(usize),
    Remove(usize),
    Weight { position: usize, weight: u8 },
    Clear,
    Export(Option<PathBuf>),
    Party(PartyCommand),
    Help,
    Quit,
}

/// `party ...` subcommands; the party is built from the character form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyCommand {
    Generate,
    Show,
    Members(u32),
    /// `None` returns to unseeded draws
    Seed(Option<String>),
    Vary { variation: Variation, on: Option<bool> },
    Separate(Option<bool>),
    Scene(Option<bool>),
    Note(String),
    ClearNotes,
    Export(Option<PathBuf>),
}

impl FromStr for PartyCommand {
    type Err = String;

    fn from_str(rest: &str) -> Result<Self, Self::Err> {
        let (word, rest) = match rest.trim().split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (rest.trim(), ""),
        };

        match word.to_lowercase().as_str() {
            "" | "generate" | "gen" => Ok(Self::Generate),
            "show" => Ok(Self::Show),
            "members" | "n" => Ok(Self::Members(number(rest, "party members <2-20>")?)),
            "seed" => match rest.to_lowercase().as_str() {
                "" | "off" | "none" => Ok(Self::Seed(None)),
                _ => Ok(Self::Seed(Some(rest.to_string()))),
            },
            "vary" => {
                let (name, state) = match rest.split_once(char::is_whitespace) {
                    Some((name, state)) => (name, state.trim()),
                    None => (rest, ""),
                };
                Ok(Self::Vary {
                    variation: required(name, "party vary <variation> [on|off]")?.parse()?,
                    on: switch(state)?,
                })
            }
            "separate" => Ok(Self::Separate(switch(rest)?)),
            "scene" => Ok(Self::Scene(switch(rest)?)),
            "note" => Ok(Self::Note(required(rest, "party note <text>")?.to_string())),
            "clear-notes" => Ok(Self::ClearNotes),
            "export" => Ok(Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            other => Err(format!("Unknown party command: {}", other)),
        }
    }
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "tab" => Ok(Self::Tab(rest.parse()?)),
            "character" | "char" | "monster" | "group" if rest.is_empty() => Ok(Self::Tab(word.parse()?)),
            "style" => Ok(Self::Style(required(rest, "style <name>")?.to_string())),
            "set" => {
                let (category, value) = pair(rest, "set <category> <value>")?;
                Ok(Self::Field {
                    category,
                    edit: FieldEdit::Choose(value),
                })
            }
            "other" => {
                let category = required(rest, "other <category> [text]")?;
                let (category, text) = match category.split_once(char::is_whitespace) {
                    Some((c, t)) => (c.to_string(), t.trim().to_string()),
                    None => (category.to_string(), String::new()),
                };
                Ok(Self::Field {
                    category,
                    edit: FieldEdit::Other(text),
                })
            }
            "check" => {
                let (category, option) = pair(rest, "check <category> <option>")?;
                Ok(Self::Field {
                    category,
                    edit: FieldEdit::Check(option),
                })
            }
            "uncheck" => {
                let (category, option) = pair(rest, "uncheck <category> <option>")?;
                Ok(Self::Field {
                    category,
                    edit: FieldEdit::Uncheck(option),
                })
            }
            "unset" => Ok(Self::Field {
                category: required(rest, "unset <category>")?.to_string(),
                edit: FieldEdit::Unset,
            }),
            "reset" => Ok(Self::Reset),
            "show" => Ok(Self::Show),
            "options" | "opts" => Ok(Self::Options((!rest.is_empty()).then(|| rest.to_string()))),
            "gritty" => Ok(Self::Gritty(switch(rest)?)),
            "count" => Ok(Self::Count(number(rest, "count <n>")?)),
            "horde" => Ok(Self::Horde(switch(rest)?)),
            "scene" => {
                let (field, value) = pair(rest, "scene <field> <value>")?;
                Ok(Self::Scene { field, value })
            }
            "toggle" => {
                let (name, state) = match rest.split_once(char::is_whitespace) {
                    Some((name, state)) => (name, state.trim()),
                    None => (rest, ""),
                };
                Ok(Self::Toggle {
                    toggle: required(name, "toggle <conflict|depth|motion> [on|off]")?.parse()?,
                    on: switch(state)?,
                })
            }
            "generate" | "gen" | "g" => Ok(Self::Generate),
            "add" => {
                let weight = if rest.is_empty() {
                    None
                } else {
                    Some(number(rest, "add [weight]")?)
                };
                Ok(Self::Add(weight))
            }
            "roster" | "ls" => Ok(Self::Roster),
            "up" => Ok(Self::Up(number(rest, "up <position>")?)),
            "down" => Ok(Self::Down(number(rest, "down <position>")?)),
            "remove" | "rm" => Ok(Self::Remove(number(rest, "remove <position>")?)),
            "weight" => {
                let (position, weight) = pair(rest, "weight <position> <1-9>")?;
                Ok(Self::Weight {
                    position: number(&position, "weight <position> <1-9>")?,
                    weight: number(&weight, "weight <position> <1-9>")?,
                })
            }
            "clear" => Ok(Self::Clear),
            "export" => Ok(Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            "party" => Ok(Self::Party(rest.parse()?)),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "" => Err("Empty command".to_string()),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(rest)
    }
}

/// First word, then the remainder (which may contain spaces)
fn pair(rest: &str, usage: &str) -> Result<(String, String), String> {
    match rest.split_once(char::is_whitespace) {
        Some((first, second)) if !second.trim().is_empty() => Ok((first.to_string(), second.trim().to_string())),
        _ => Err(format!("Usage: {}", usage)),
    }
}

fn number<T: FromStr>(raw: &str, usage: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("Expected a number, got '{}'. Usage: {}", raw.trim(), usage))
}

/// `on`/`off` style argument; empty means "flip"
fn switch(raw: &str) -> Result<Option<bool>, String> {
    match raw.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "on" | "yes" | "true" | "1" => Ok(Some(true)),
        "off" | "no" | "false" | "0" => Ok(Some(false)),
        other => Err(format!("Expected on or off, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ReplCommand {
        line.parse().unwrap()
    }

    #[test]
    fn test_parse_tab() {
        assert_eq!(parse("tab monster"), ReplCommand::Tab(FormKind::Monster));
        assert_eq!(parse("/group"), ReplCommand::Tab(FormKind::Group));
        assert!("tab dungeon".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_field_edits() {
        assert_eq!(
            parse("set race Dark Elf"),
            ReplCommand::Field {
                category: "race".to_string(),
                edit: FieldEdit::Choose("Dark Elf".to_string())
            }
        );
        assert_eq!(
            parse("other notable-traits scar; burn"),
            ReplCommand::Field {
                category: "notable-traits".to_string(),
                edit: FieldEdit::Other("scar; burn".to_string())
            }
        );
        assert_eq!(
            parse("other role-class"),
            ReplCommand::Field {
                category: "role-class".to_string(),
                edit: FieldEdit::Other(String::new())
            }
        );
        assert_eq!(
            parse("/unset race"),
            ReplCommand::Field {
                category: "race".to_string(),
                edit: FieldEdit::Unset
            }
        );
        assert!("set race".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_roster_commands() {
        assert_eq!(parse("add"), ReplCommand::Add(None));
        assert_eq!(parse("add 7"), ReplCommand::Add(Some(7)));
        assert_eq!(parse("up 2"), ReplCommand::Up(2));
        assert_eq!(parse("rm 1"), ReplCommand::Remove(1));
        assert_eq!(parse("weight 3 9"), ReplCommand::Weight { position: 3, weight: 9 });
        assert!("weight 3".parse::<ReplCommand>().is_err());
        assert!("down two".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_switches() {
        assert_eq!(parse("gritty"), ReplCommand::Gritty(None));
        assert_eq!(parse("horde on"), ReplCommand::Horde(Some(true)));
        assert_eq!(
            parse("toggle depth off"),
            ReplCommand::Toggle {
                toggle: SceneToggle::Depth,
                on: Some(false)
            }
        );
        assert!("gritty maybe".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_party() {
        assert_eq!(parse("party"), ReplCommand::Party(PartyCommand::Generate));
        assert_eq!(parse("/party members 6"), ReplCommand::Party(PartyCommand::Members(6)));
        assert_eq!(
            parse("party seed old road"),
            ReplCommand::Party(PartyCommand::Seed(Some("old road".to_string())))
        );
        assert_eq!(parse("party seed off"), ReplCommand::Party(PartyCommand::Seed(None)));
        assert_eq!(
            parse("party vary head-hair off"),
            ReplCommand::Party(PartyCommand::Vary {
                variation: Variation::HeadHair,
                on: Some(false)
            })
        );
        assert_eq!(parse("party scene on"), ReplCommand::Party(PartyCommand::Scene(Some(true))));
        assert_eq!(
            parse("party note Name: Kael, Role: Ranger"),
            ReplCommand::Party(PartyCommand::Note("Name: Kael, Role: Ranger".to_string()))
        );
        assert!("party vary wings".parse::<ReplCommand>().is_err());
        assert!("party note".parse::<ReplCommand>().is_err());
        assert!("party dance".parse::<ReplCommand>().is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse("export out/scene"), ReplCommand::Export(Some(PathBuf::from("out/scene"))));
        assert_eq!(parse("export"), ReplCommand::Export(None));
        assert_eq!(parse("options race"), ReplCommand::Options(Some("race".to_string())));
        assert_eq!(
            parse("scene camera Low angle"),
            ReplCommand::Scene {
                field: "camera".to_string(),
                value: "Low angle".to_string()
            }
        );
        assert_eq!(parse("QUIT"), ReplCommand::Quit);
        assert!("dance".parse::<ReplCommand>().is_err());
    }
}
