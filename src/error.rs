//! Structured error types for configuration loading and lookup.

use crate::config::SourceFormat;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration (or a preset) could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the validation issues if this is a validation failure.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Validation(err) => &err.issues,
            _ => &[],
        }
    }
}

/// The source text is not a well-formed structured literal.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub path: Option<PathBuf>,
    pub format: SourceFormat,
    /// 1-based line, 0 when the underlying reader gave no position.
    pub line: usize,
    /// 1-based column, 0 when unknown.
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(format: SourceFormat, message: impl Into<String>) -> Self {
        Self {
            path: None,
            format,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parse error", self.format)?;
        if let Some(ref path) = self.path {
            write!(f, " in {}", path.display())?;
        }
        if self.line > 0 {
            write!(f, " at line {}, column {}", self.line, self.column)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Issue codes for programmatic handling of validation failures.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    MissingField,
    EmptyContent,
    InvalidPattern,
    InvalidColor,
    DuplicateKey,
    WrongType,
    UnknownKey,
    PresetNotFile,
    PresetCycle,
}

/// A single semantic problem found while validating a document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    /// Dotted path to the offending field, e.g. `theme.extend.colors.telegram.bg`.
    pub field: String,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(IssueKind::MissingField, field, format!("{} is required", field))
    }

    pub fn wrong_type(field: &str, expected: &str, found: &str) -> Self {
        Self::new(
            IssueKind::WrongType,
            field,
            format!("{} must be {}, found {}", field, expected, found),
        )
    }

    pub fn duplicate_key(field: &str, key: &str) -> Self {
        Self::new(
            IssueKind::DuplicateKey,
            field,
            format!("key '{}' is defined more than once in {}", key, display_field(field)),
        )
    }

    pub fn invalid_color(field: &str, value: &str) -> Self {
        Self::new(
            IssueKind::InvalidColor,
            field,
            format!("'{}' is not a hex color (#RGB or #RRGGBB)", value),
        )
    }
}

fn display_field(field: &str) -> &str {
    if field.is_empty() { "the document" } else { field }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The document is syntactically valid but violates the schema.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: Option<PathBuf>,
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { path: None, issues }
    }

    pub fn single(issue: Issue) -> Self {
        Self::new(vec![issue])
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Whether any issue has the given kind.
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "invalid configuration {}", path.display())?,
            None => write!(f, "invalid configuration")?,
        }
        match self.issues.as_slice() {
            [] => Ok(()),
            [issue] => write!(f, ": {}", issue),
            issues => {
                write!(f, " ({} issues)", issues.len())?;
                for issue in issues {
                    write!(f, "\n  - {}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A color query named a family or shade the palette does not define.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("color family '{family}' is not defined in theme.extend.colors")]
    UnknownFamily { family: String },

    #[error("color family '{family}' has no shade '{shade}'")]
    UnknownShade { family: String, shade: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
