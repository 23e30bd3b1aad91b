//! twconfig
//!
//! Loads, validates, and queries the configuration file of a utility-class
//! CSS tool.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use twconfig::cli::{Cli, Command};
use twconfig::config::{ConfigLoader, ConfigPaths, DEFAULT_SHADE};
use twconfig::format::{format_document, format_issues, format_tokens};
use twconfig::logging::{self, LogTarget};
use twconfig::{ConfigDocument, ConfigError};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(dir) = &cli.project_dir {
        paths.project_dir = PathBuf::from(dir);
    }
    if let Some(config) = &cli.config {
        paths.explicit = Some(PathBuf::from(config));
    }
    let loader = ConfigLoader::new(cli.load_options());
    debug!("Resolving configuration from {}", paths.project_dir.display());

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => run_check(&loader, &paths),
        Command::Content => {
            let doc = loader.discover(&paths)?;
            for pattern in doc.content() {
                println!("{}", pattern);
            }
            Ok(())
        }
        Command::Color { family, shade } => {
            let doc = loader.discover(&paths)?;
            let shade = shade.as_deref().unwrap_or(DEFAULT_SHADE);
            let color = doc.resolve_color(&family, shade).map_err(ConfigError::from)?;
            println!("{}", color);
            Ok(())
        }
        Command::Tokens => {
            let doc = loader.discover(&paths)?;
            print!("{}", format_tokens(&doc));
            Ok(())
        }
        Command::Show { output } => {
            let doc = loader.discover(&paths)?;
            print!("{}", format_document(&doc, output)?);
            Ok(())
        }
    }
}

/// Validate the configuration and report every issue; exits non-zero on failure.
fn run_check(loader: &ConfigLoader, paths: &ConfigPaths) -> Result<()> {
    match loader.discover(paths) {
        Ok(doc) => {
            print_warnings(&doc);
            println!("{}", summary(&doc));
            Ok(())
        }
        Err(ConfigError::Validation(err)) => {
            match &err.path {
                Some(path) => eprintln!("{}: {} issue(s)", path.display(), err.issues.len()),
                None => eprintln!("{} issue(s)", err.issues.len()),
            }
            eprint!("{}", format_issues(&err.issues));
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn print_warnings(doc: &ConfigDocument) {
    if doc.warnings().is_empty() {
        return;
    }
    eprintln!("warning(s):");
    eprint!("{}", format_issues(doc.warnings()));
}

fn summary(doc: &ConfigDocument) -> String {
    let source = doc
        .source()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<inline>".to_string());
    format!(
        "{}: ok ({} content pattern(s), {} color token(s), {} plugin(s))",
        source,
        doc.content().len(),
        doc.tokens().count(),
        doc.plugins().len()
    )
}
