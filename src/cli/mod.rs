//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Tabula using clap.

pub mod commands;

use crate::domain::TabulaError;
use clap::{Parser, Subcommand};

/// Tabula - record-to-document exporter
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(version, about, long_about = None)]
#[command(author = "Tabula Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tabula.toml", env = "TABULA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TABULA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the records of a dataset into a document
    Export(commands::export::ExportArgs),

    /// Parse export definitions and report their columns
    ValidateDefinition(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Exit code for a failed command
///
/// Configuration and definition problems exit with 2, everything else
/// with 5.
pub fn exit_code_for(error: &TabulaError) -> i32 {
    match error {
        TabulaError::ConfigNotFound(_)
        | TabulaError::FormatNotFound(_)
        | TabulaError::Definition(_)
        | TabulaError::Template(_)
        | TabulaError::Configuration(_)
        | TabulaError::Validation(_) => 2,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from([
            "tabula",
            "export",
            "--model",
            "Addressbook_Model_Contact",
            "--dataset",
            "contacts.json",
        ]);
        assert_eq!(cli.config, "tabula.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["tabula", "--config", "custom.toml", "validate-definition"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["tabula", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_definition() {
        let cli = Cli::parse_from(["tabula", "validate-definition", "defs/adb_default.xml"]);
        match cli.command {
            Commands::ValidateDefinition(args) => assert_eq!(args.files.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["tabula", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&TabulaError::ConfigNotFound("x".into())), 2);
        assert_eq!(exit_code_for(&TabulaError::Definition("x".into())), 2);
        assert_eq!(exit_code_for(&TabulaError::Source("x".into())), 5);
        assert_eq!(exit_code_for(&TabulaError::Sink("x".into())), 5);
    }
}
