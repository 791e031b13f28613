//! Model — ReaderConfig and related structs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::{MAX_LINE_SIZE, MAX_PENDING_FRAGMENTS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub output: OutputFormat,
    /// Tracing directive used when `RUST_LOG` is not set
    pub log_filter: String,
    pub reassembly: ReassemblyConfig,
}

/// How parsed logs are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per event
    Json,
    /// Per-file counts
    #[default]
    Summary,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(ConfigError::Invalid(format!("unknown output format: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblyConfig {
    /// Longer physical lines fail instead of being parsed
    pub max_line_length: usize,
    /// Fragments allowed to wait for their remainder at once
    pub max_pending_fragments: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            log_filter: "gclog=info".to_string(),
            reassembly: ReassemblyConfig::default(),
        }
    }
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            max_line_length: MAX_LINE_SIZE,
            max_pending_fragments: MAX_PENDING_FRAGMENTS,
        }
    }
}

impl ReassemblyConfig {
    /// Validate reassembly limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length == 0 {
            return Err(ConfigError::Invalid("reassembly.max_line_length must be > 0".to_string()));
        }
        // a merged remark line may leave two fragments waiting
        if self.max_pending_fragments < 2 {
            return Err(ConfigError::Invalid(
                "reassembly.max_pending_fragments must be >= 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn test_reader_config_defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.output, OutputFormat::Summary);
        assert_eq!(cfg.log_filter, "gclog=info");
        assert_eq!(cfg.reassembly.max_line_length, 1_048_576);
        assert_eq!(cfg.reassembly.max_pending_fragments, 4);
    }

    // ── Validation ───────────────────────────────────────────────

    #[test]
    fn test_reassembly_validate_default_passes() {
        assert!(ReassemblyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reassembly_validate_rejects_single_fragment() {
        let cfg = ReassemblyConfig { max_pending_fragments: 1, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_pending_fragments"), "Error should mention max_pending_fragments: {}", err);
    }

    #[test]
    fn test_reassembly_validate_rejects_zero_line_length() {
        let cfg = ReassemblyConfig { max_line_length: 0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_line_length"), "Error should mention max_line_length: {}", err);
    }

    // ── Output format ────────────────────────────────────────────

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(" Summary ".parse::<OutputFormat>().unwrap(), OutputFormat::Summary);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    // ── Serialization Round-trip ─────────────────────────────────

    #[test]
    fn test_reader_config_toml_round_trip() {
        let cfg = ReaderConfig { output: OutputFormat::Json, ..Default::default() };
        let toml_str = toml::to_string(&cfg).expect("Should serialize to TOML");
        let deserialized: ReaderConfig = toml::from_str(&toml_str).expect("Should deserialize from TOML");
        assert_eq!(deserialized.output, OutputFormat::Json);
        assert_eq!(deserialized.log_filter, cfg.log_filter);
        assert_eq!(deserialized.reassembly.max_line_length, cfg.reassembly.max_line_length);
    }

    #[test]
    fn test_reader_config_deserialize_partial_toml() {
        // Only set one nested value; rest should use defaults via #[serde(default)]
        let toml_str = r#"
            [reassembly]
            max_pending_fragments = 8
        "#;
        let cfg: ReaderConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.reassembly.max_pending_fragments, 8);
        assert_eq!(cfg.reassembly.max_line_length, 1_048_576); // default
        assert_eq!(cfg.output, OutputFormat::Summary); // default
    }

    #[test]
    fn test_reader_config_rejects_unknown_output() {
        let toml_str = r#"output = "xml""#;
        assert!(toml::from_str::<ReaderConfig>(toml_str).is_err());
    }
}
