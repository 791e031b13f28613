//! Cli — command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::conf::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "gclog")]
#[command(about = "Parse Sun / Oracle JVM garbage collection logs")]
#[command(version)]
pub struct Cli {
    /// GC log files to read
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Path to a TOML config file (default: gclog.toml if present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format, overrides the config file and GCLOG_OUTPUT
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_files_and_flags() {
        let cli = Cli::try_parse_from(["gclog", "--output", "json", "-c", "my.toml", "a.log", "b.log"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.log"), PathBuf::from("b.log")]);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
    }

    #[test]
    fn test_cli_requires_a_file() {
        assert!(Cli::try_parse_from(["gclog"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_output() {
        assert!(Cli::try_parse_from(["gclog", "--output", "xml", "a.log"]).is_err());
    }
}
