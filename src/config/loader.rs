//! Configuration loader.
//!
//! Reads a configuration file, parses it according to its format, layers it
//! over any presets it names, and validates the result.

use super::literal::Literal;
use super::merge::deep_merge_all;
use super::source::SourceFormat;
use super::types::{ConfigDocument, UnknownKeyBehavior};
use super::validate::Validator;
use crate::error::{ConfigError, ConfigResult, Issue, IssueKind, ValidationError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "TWCONFIG_CONFIG_PATH";

/// File names probed in the project directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
    "tailwind.config.ts",
    "tailwind.config.cts",
    "tailwind.config.mts",
    "tailwind.config.json",
    "tailwind.config.yaml",
    "tailwind.config.yml",
];

/// Where to look for the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Directory probed for the default file names.
    pub project_dir: PathBuf,
    /// Explicit file that bypasses probing.
    pub explicit: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover paths from the environment and the working directory.
    pub fn discover() -> Self {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let project_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            project_dir,
            explicit,
        }
    }

    /// Create paths with an explicit project directory.
    pub fn with_dirs(project_dir: impl Into<PathBuf>, explicit: Option<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            explicit,
        }
    }

    /// Candidate files in probe order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.project_dir.join(name))
            .collect()
    }

    /// The file to load: the explicit one, or the first candidate that exists.
    pub fn resolve(&self) -> ConfigResult<PathBuf> {
        if let Some(ref explicit) = self.explicit {
            return Ok(explicit.clone());
        }
        self.candidates()
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| {
                ConfigError::io(
                    &self.project_dir,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!(
                            "no configuration file found (looked for {})",
                            CONFIG_FILE_NAMES.join(", ")
                        ),
                    ),
                )
            })
    }
}

/// Options controlling how a document is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Policy for unrecognized top-level keys.
    pub unknown_keys: UnknownKeyBehavior,
    /// Force a source format instead of detecting it from the extension.
    pub format: Option<SourceFormat>,
}

/// Loads configuration documents.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    options: LoadOptions,
}

impl ConfigLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Find the configuration file and load it.
    pub fn discover(&self, paths: &ConfigPaths) -> ConfigResult<ConfigDocument> {
        let path = paths.resolve()?;
        self.load(path)
    }

    /// Load and validate the configuration file at `path`.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<ConfigDocument> {
        let path = path.as_ref();
        let format = self.options.format.unwrap_or_else(|| detect_format(path));
        info!(path = %path.display(), %format, "loading configuration");

        let literal = read_literal(path, format)?;
        let mut chain = vec![canonical(path)];
        let literal = self.apply_presets(literal, parent_dir(path), &mut chain)?;

        let doc = Validator::new(self.options.unknown_keys)
            .validate(&literal)
            .map_err(|e| e.with_path(path))?;
        info!(
            path = %path.display(),
            patterns = doc.content().len(),
            warnings = doc.warnings().len(),
            "configuration loaded"
        );
        Ok(doc.with_source(path))
    }

    /// Parse and validate text that is not backed by a file.
    ///
    /// Presets are resolved against `base_dir`, or the working directory when absent.
    pub fn load_str(
        &self,
        text: &str,
        format: SourceFormat,
        base_dir: Option<&Path>,
    ) -> ConfigResult<ConfigDocument> {
        let literal = format.parse(text)?;
        let base_dir = match base_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        let literal = self.apply_presets(literal, base_dir, &mut Vec::new())?;
        let doc = Validator::new(self.options.unknown_keys).validate(&literal)?;
        Ok(doc)
    }

    /// Layer `literal` over the presets it lists, depth-first.
    ///
    /// `chain` holds the canonical paths currently being loaded, for cycle detection.
    fn apply_presets(
        &self,
        literal: Literal,
        base_dir: PathBuf,
        chain: &mut Vec<PathBuf>,
    ) -> ConfigResult<Literal> {
        let specs = preset_specs(&literal).map_err(|e| match chain.last() {
            Some(origin) => e.with_path(origin),
            None => e,
        })?;
        if specs.is_empty() {
            return Ok(literal);
        }

        let mut layers = Vec::with_capacity(specs.len() + 1);
        for (idx, spec) in specs.into_iter().enumerate() {
            let path = base_dir.join(&spec);
            let resolved = std::fs::canonicalize(&path).map_err(|e| ConfigError::io(&path, e))?;
            if chain.contains(&resolved) {
                let issue = Issue::new(
                    IssueKind::PresetCycle,
                    format!("presets[{}]", idx),
                    format!("preset '{}' includes itself", spec),
                );
                let mut err = ValidationError::single(issue);
                if let Some(origin) = chain.last() {
                    err = err.with_path(origin);
                }
                return Err(err.into());
            }

            debug!(preset = %path.display(), "applying preset");
            let preset = read_literal(&path, detect_format(&path))?;
            chain.push(resolved);
            let preset = self.apply_presets(preset, parent_dir(&path), chain)?;
            chain.pop();
            layers.push(preset);
        }
        layers.push(literal);
        Ok(deep_merge_all(layers))
    }
}

/// Unknown or missing extensions are read as script modules, the usual form of these files.
fn detect_format(path: &Path) -> SourceFormat {
    SourceFormat::from_path(path).unwrap_or(SourceFormat::Script)
}

fn read_literal(path: &Path, format: SourceFormat) -> ConfigResult<Literal> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let literal = format.parse(&text).map_err(|e| e.with_path(path))?;
    Ok(literal)
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Preset file paths listed under `presets`.
fn preset_specs(literal: &Literal) -> Result<Vec<String>, ValidationError> {
    let items = match literal.get("presets") {
        None | Some(Literal::Null) => return Ok(Vec::new()),
        Some(Literal::Array(items)) => items,
        Some(other) => {
            return Err(ValidationError::single(Issue::wrong_type(
                "presets",
                "an array of preset paths",
                other.kind(),
            )));
        }
    };

    let mut specs = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let field = format!("presets[{}]", idx);
        let spec = match item.as_require().or_else(|| item.as_str()) {
            Some(spec) => spec,
            None => {
                issues.push(Issue::wrong_type(&field, "a preset path", item.kind()));
                continue;
            }
        };
        let is_file = spec.starts_with("./") || spec.starts_with("../") || Path::new(spec).is_absolute();
        if !is_file {
            issues.push(Issue::new(
                IssueKind::PresetNotFile,
                &field,
                format!("preset '{}' is not a file path (use ./ or ../)", spec),
            ));
            continue;
        }
        specs.push(spec.to_string());
    }
    if issues.is_empty() {
        Ok(specs)
    } else {
        Err(ValidationError::new(issues))
    }
}
