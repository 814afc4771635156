//! promptmixer configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bus::{MAX_ITEMS, MAX_WEIGHT, MIN_WEIGHT, Weight};

/// Main promptmixer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Group roster limits
    pub roster: RosterConfig,

    /// Where exported prompts go
    pub export: ExportConfig,

    /// Vocabulary catalog override
    pub catalog: CatalogConfig,

    /// Prompt template overrides
    pub templates: TemplatesConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.roster.max_items == 0 {
            return Err(eyre::eyre!("roster.max-items must be at least 1"));
        }
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&self.roster.default_weight) {
            return Err(eyre::eyre!(
                "roster.default-weight must be between {} and {}, got {}",
                MIN_WEIGHT,
                MAX_WEIGHT,
                self.roster.default_weight
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .promptmixer.yml
        let local_config = PathBuf::from(".promptmixer.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/promptmixer/promptmixer.yml
        if let Some(user_config) = user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Follows the same fallback chain as [`Config::load`] and swallows errors;
    /// the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(".promptmixer.yml"))
                .chain(user_config_path())
                .collect(),
        };
        candidates
            .into_iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(path).ok())
            .and_then(|config| config.log_level)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("promptmixer").join("promptmixer.yml"))
}

/// Group roster limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Maximum number of entries in the group roster
    #[serde(rename = "max-items")]
    pub max_items: usize,

    /// Weight given to newly added entries
    #[serde(rename = "default-weight")]
    pub default_weight: u8,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            default_weight: Weight::default().get(),
        }
    }
}

impl RosterConfig {
    /// Default weight as a validated [`Weight`], falling back to the built-in default
    pub fn weight(&self) -> Weight {
        Weight::new(self.default_weight).unwrap_or_default()
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for exports without an explicit path
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Catalog override
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// YAML catalog replacing the embedded one
    pub path: Option<PathBuf>,
}

/// Template override directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory searched for `{name}.pmt` before the embedded templates
    pub directory: Option<PathBuf>,
}

impl TemplatesConfig {
    /// Configured directory, else `~/.config/promptmixer/prompts`
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.directory
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("promptmixer").join("prompts")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.roster.max_items, 12);
        assert_eq!(config.roster.default_weight, 3);
        assert_eq!(config.export.directory, PathBuf::from("."));
        assert!(config.catalog.path.is_none());
        assert!(config.log_level.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
roster:
  max-items: 6
  default-weight: 5

export:
  directory: /tmp/prompts

catalog:
  path: /etc/promptmixer/catalog.yml

templates:
  directory: /etc/promptmixer/prompts

log-level: DEBUG
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.roster.max_items, 6);
        assert_eq!(config.roster.weight().get(), 5);
        assert_eq!(config.export.directory, PathBuf::from("/tmp/prompts"));
        assert_eq!(config.catalog.path, Some(PathBuf::from("/etc/promptmixer/catalog.yml")));
        assert_eq!(
            config.templates.resolve_dir(),
            Some(PathBuf::from("/etc/promptmixer/prompts"))
        );
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
roster:
  max-items: 4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.roster.max_items, 4);

        // Defaults for unspecified
        assert_eq!(config.roster.default_weight, 3);
        assert_eq!(config.export.directory, PathBuf::from("."));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.roster.default_weight = 12;
        assert!(config.validate().is_err());
        assert_eq!(config.roster.weight().get(), 3);

        let mut config = Config::default();
        config.roster.max_items = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pmx.yml");
        fs::write(&path, "log-level: warn\nroster:\n  max-items: 2\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.roster.max_items, 2);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
