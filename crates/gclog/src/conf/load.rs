//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use super::model::{ConfigError, OutputFormat, ReaderConfig};

pub const DEFAULT_CONFIG_FILE: &str = "gclog.toml";

impl ReaderConfig {
    /// Load configuration from file and environment variables
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// An explicitly given path must exist; the default one may be absent.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(str::to_string)
            .or_else(|| std::env::var("GCLOG_CONFIG_FILE").ok());
        let config_path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if explicit.is_some() || Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let io_error = |source| ConfigError::Io { path: path.to_string(), source };
        let mut file = File::open(path).map_err(io_error)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_error)?;

        toml::from_str(&contents).map_err(|source| ConfigError::Toml { path: path.to_string(), source })
    }

    /// Apply `GCLOG_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(output) = parse_var::<OutputFormat>(&lookup, "GCLOG_OUTPUT")? {
            self.output = output;
        }
        if let Some(filter) = lookup("GCLOG_LOG_FILTER") {
            self.log_filter = filter;
        }
        if let Some(len) = parse_var(&lookup, "GCLOG_MAX_LINE_LENGTH")? {
            self.reassembly.max_line_length = len;
        }
        if let Some(max) = parse_var(&lookup, "GCLOG_MAX_PENDING_FRAGMENTS")? {
            self.reassembly.max_pending_fragments = max;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".to_string()));
        }
        self.reassembly.validate()
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value: '{}'", key, raw))),
    }
}
