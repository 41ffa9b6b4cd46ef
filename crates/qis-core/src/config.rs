//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `qis-cal.toml` configuration file
//! 3. Default values
//!
//! `${VAR_NAME}` inside the configuration file is replaced by the value of
//! the environment variable.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "qis-cal.toml";

/// Geometry of the QIS timetable grid
///
/// The values describe the fixed table layout the grid normalizer is
/// written for. They are never inferred from the input: a table that
/// does not fit is rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Number of columns a row may occupy, time axis included
    #[serde(default = "default_max_columns")]
    pub max_columns: usize,

    /// Leading columns that carry no date (time axis and its spacer)
    #[serde(default = "default_date_column_offset")]
    pub date_column_offset: usize,

    /// Length of one table row in minutes
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,

    /// Largest row span accepted, i.e. the lookahead of the shift window
    #[serde(default = "default_max_row_span")]
    pub max_row_span: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            max_columns: default_max_columns(),
            date_column_offset: default_date_column_offset(),
            slot_minutes: default_slot_minutes(),
            max_row_span: default_max_row_span(),
        }
    }
}

impl GridLayout {
    /// Reject layouts the normalizer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_columns <= self.date_column_offset {
            return Err(Error::Config(format!(
                "max_columns ({}) must exceed date_column_offset ({})",
                self.max_columns, self.date_column_offset
            )));
        }
        if self.slot_minutes == 0 || 60 % self.slot_minutes != 0 {
            return Err(Error::Config(format!(
                "slot_minutes ({}) must divide an hour",
                self.slot_minutes
            )));
        }
        if self.max_row_span == 0 {
            return Err(Error::Config("max_row_span must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn default_max_columns() -> usize {
    9
}

fn default_date_column_offset() -> usize {
    2
}

fn default_slot_minutes() -> u32 {
    15
}

fn default_max_row_span() -> usize {
    // one full day of quarter-hour rows
    96
}

/// Settings for retrieving schedule pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("qis-cal/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings for the written calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the calendar file
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Optional display name of the calendar (`X-WR-CALNAME`)
    #[serde(default)]
    pub calendar_name: Option<String>,

    /// PRODID written into the calendar
    #[serde(default = "default_product_id")]
    pub product_id: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            calendar_name: None,
            product_id: default_product_id(),
        }
    }
}

fn default_output_path() -> String {
    "schedule.ics".to_string()
}

fn default_product_id() -> String {
    "-//qis-cal//room schedule//EN".to_string()
}

/// Main configuration for qis-cal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page retrieval
    #[serde(default)]
    pub source: SourceConfig,

    /// Calendar output
    #[serde(default)]
    pub output: OutputConfig,

    /// Timetable geometry
    #[serde(default)]
    pub grid: GridLayout,
}

impl Config {
    /// Replace `${VAR_NAME}` with the value of the environment variable.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse configuration from TOML text, expanding environment variables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let config: Config = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.grid.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// Environment variables take precedence over the file contents.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides()?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(cfg)
    }

    /// Load configuration from an explicit path, the default file, or the
    /// environment alone, in that order.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_toml_file(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("QIS_OUTPUT") {
            if !path.is_empty() {
                self.output.path = path;
            }
        }

        if let Ok(secs) = std::env::var("QIS_TIMEOUT_SECS") {
            self.source.timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("QIS_TIMEOUT_SECS is not a number: {}", secs)))?;
        }

        if let Ok(agent) = std::env::var("QIS_USER_AGENT") {
            if !agent.is_empty() {
                self.source.user_agent = agent;
            }
        }

        if let Ok(columns) = std::env::var("QIS_MAX_COLUMNS") {
            self.grid.max_columns = columns
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("QIS_MAX_COLUMNS is not a number: {}", columns)))?;
        }

        self.grid.validate()
    }
}
