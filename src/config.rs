use crate::logging::{LogConfig, LogFormat, LogOutput};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// File name searched for by [`Config::discover`]
pub const CONFIG_FILE_NAME: &str = ".osahandlerrc";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub handlers: HandlerConfig,

    #[serde(default)]
    pub event: EventConfig,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// How handler names are written into the event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// Lower-case the name; handler lookup in scripts is case-insensitive
    #[default]
    Lower,
    /// Send the name exactly as given
    Preserve,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub name_case: NameCase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default = "default_return_id")]
    pub return_id: i16,

    #[serde(default)]
    pub transaction_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Write daily-rotated files here instead of stderr
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            return_id: default_return_id(),
            transaction_id: 0,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            directory: None,
        }
    }
}

fn default_return_id() -> i16 { crate::event::AUTO_GENERATE_RETURN_ID }
fn default_level() -> String { "info".to_string() }

impl LoggingSection {
    /// Translate into a [`LogConfig`]; unknown levels fall back to INFO
    pub fn to_log_config(&self) -> LogConfig {
        let level = self.level.parse::<Level>().unwrap_or(Level::INFO);
        let output = match &self.directory {
            Some(directory) => LogOutput::File {
                directory: directory.clone(),
                prefix: "osa-handler".to_string(),
            },
            None => LogOutput::Stderr,
        };

        LogConfig::new()
            .with_level(level)
            .with_format(self.format)
            .with_output(output)
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Failed to read config {}: {}", path.display(), source)
            }
            Self::Parse(err) => write!(f, "Failed to parse config: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Find and load configuration file from current directory or parents
    pub fn discover() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(_) => Self::default(),
        }
    }

    /// Like [`Config::discover`], starting at `start`
    pub fn discover_from(start: &Path) -> Self {
        let mut current = Some(start);

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), err);
                    }
                }
            }
            current = dir.parent();
        }

        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.handlers.name_case, NameCase::Lower);
        assert_eq!(config.event.return_id, -1);
        assert_eq!(config.event.transaction_id, 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(
            r#"
            [handlers]
            name_case = "preserve"

            [event]
            transaction_id = 7

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.handlers.name_case, NameCase::Preserve);
        assert_eq!(config.event.return_id, -1);
        assert_eq!(config.event.transaction_id, 7);

        let log = config.logging.to_log_config();
        assert_eq!(log.level, Level::DEBUG);
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.output, LogOutput::Stderr);
    }

    #[test]
    fn test_parse_invalid() {
        let err = Config::parse("[handlers]\nname_case = \"upper\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_and_discover() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[handlers]\nname_case = \"preserve\"\n",
        )
        .unwrap();

        let loaded = Config::load(&root.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(loaded.handlers.name_case, NameCase::Preserve);

        let discovered = Config::discover_from(&nested);
        assert_eq!(discovered, loaded);
    }

    #[test]
    fn test_load_missing() {
        let root = tempfile::tempdir().unwrap();
        let err = Config::load(&root.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_file_output() {
        let section = LoggingSection {
            directory: Some("/tmp/logs".to_string()),
            ..LoggingSection::default()
        };
        assert_eq!(
            section.to_log_config().output,
            LogOutput::File {
                directory: "/tmp/logs".to_string(),
                prefix: "osa-handler".to_string(),
            }
        );
    }
}
