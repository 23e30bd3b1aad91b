//! CLI command definitions for twconfig
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{LoadOptions, SourceFormat, UnknownKeyBehavior};
use crate::format::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Policy for unrecognized top-level keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnknownKeys {
    /// Ignore silently
    Allow,
    /// Ignore and print a warning (default)
    #[default]
    Warn,
    /// Fail validation
    Reject,
}

impl From<UnknownKeys> for UnknownKeyBehavior {
    fn from(value: UnknownKeys) -> Self {
        match value {
            UnknownKeys::Allow => UnknownKeyBehavior::Allow,
            UnknownKeys::Warn => UnknownKeyBehavior::Warn,
            UnknownKeys::Reject => UnknownKeyBehavior::Reject,
        }
    }
}

/// Parse a `show --output` value.
fn parse_output_format(value: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(value)
        .ok_or_else(|| format!("unknown output format '{}' (expected text, json or yaml)", value))
}

/// Load, validate, and query utility-CSS configuration files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: probe tailwind.config.* in the project directory)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Project directory to probe for a configuration file
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<String>,

    /// Read the file as this format (script, json, yaml) instead of detecting it from the extension
    #[arg(long, global = true)]
    pub source_format: Option<SourceFormat>,

    /// What to do with unrecognized top-level keys
    #[arg(long, value_enum, default_value_t = UnknownKeys::Warn, global = true)]
    pub unknown_keys: UnknownKeys,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Loader options derived from the global flags.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            unknown_keys: self.unknown_keys.into(),
            format: self.source_format,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Load and validate the configuration (default if no subcommand given)
    Check,

    /// Print the content glob patterns, one per line
    Content,

    /// Resolve a color from theme.extend.colors
    Color {
        /// Color family, e.g. `telegram`
        family: String,
        /// Shade within the family, e.g. `primary` (default: DEFAULT)
        shade: Option<String>,
    },

    /// List color tokens of the extended palette
    Tokens,

    /// Print the normalized configuration
    Show {
        /// Output format: text, json or yaml
        #[arg(short, long, value_parser = parse_output_format, default_value = "text")]
        output: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["twconfig"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.unknown_keys, UnknownKeys::Warn);
        assert_eq!(cli.log, "2");
        assert_eq!(cli.load_options().format, None);
    }

    #[test]
    fn test_color_command() {
        let cli = Cli::try_parse_from(["twconfig", "color", "telegram", "hover"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Color {
                family: "telegram".into(),
                shade: Some("hover".into())
            })
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "twconfig",
            "show",
            "--output",
            "json",
            "--config",
            "tw.yaml",
            "--unknown-keys",
            "reject",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("tw.yaml"));
        assert_eq!(
            cli.load_options().unknown_keys,
            UnknownKeyBehavior::Reject
        );
        assert_eq!(
            cli.command,
            Some(Command::Show {
                output: OutputFormat::Json
            })
        );
    }

    #[test]
    fn test_show_defaults_to_text() {
        let cli = Cli::try_parse_from(["twconfig", "show"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Show {
                output: OutputFormat::Text
            })
        );
        assert_eq!(cli.load_options().format, None);
        assert_eq!(cli.load_options().unknown_keys, UnknownKeyBehavior::Warn);
    }

    #[test]
    fn test_source_format_override() {
        let cli = Cli::try_parse_from(["twconfig", "--source-format", "yaml", "show", "-o", "yml"]).unwrap();
        assert_eq!(cli.load_options().format, Some(SourceFormat::Yaml));
        assert_eq!(
            cli.command,
            Some(Command::Show {
                output: OutputFormat::Yaml
            })
        );
        assert!(Cli::try_parse_from(["twconfig", "show", "--output", "xml"]).is_err());
        assert!(Cli::try_parse_from(["twconfig", "--source-format", "toml"]).is_err());
    }
}
