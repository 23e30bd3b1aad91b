//! Source formats and dispatch from raw text to a [`Literal`].

use super::literal::Literal;
use super::script;
use crate::error::ParseError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Syntax a configuration file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// JavaScript or TypeScript module exporting an object literal.
    Script,
    Json,
    Yaml,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "cjs" | "mjs" | "ts" | "cts" | "mts" => Some(SourceFormat::Script),
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Script => "script",
            SourceFormat::Json => "json",
            SourceFormat::Yaml => "yaml",
        }
    }

    /// Parse source text into a literal tree.
    pub fn parse(&self, text: &str) -> Result<Literal, ParseError> {
        match self {
            SourceFormat::Script => script::parse_module(text),
            SourceFormat::Json => serde_json::from_str(text).map_err(|e| {
                ParseError::new(*self, strip_position(&e.to_string())).at(e.line(), e.column())
            }),
            SourceFormat::Yaml => {
                // An empty YAML stream is a null document, not an error.
                if text.trim().is_empty() {
                    return Ok(Literal::Null);
                }
                serde_yaml::from_str(text).map_err(|e| {
                    let err = ParseError::new(*self, strip_position(&e.to_string()));
                    match e.location() {
                        Some(loc) => err.at(loc.line(), loc.column()),
                        None => err,
                    }
                })
            }
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "script" | "js" | "ts" => Ok(SourceFormat::Script),
            "json" => Ok(SourceFormat::Json),
            "yaml" | "yml" => Ok(SourceFormat::Yaml),
            other => Err(format!("unknown source format '{}'", other)),
        }
    }
}

/// serde readers append " at line L column C"; the position is reported separately.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_path() {
        let cases = [
            ("tailwind.config.js", Some(SourceFormat::Script)),
            ("tailwind.config.mts", Some(SourceFormat::Script)),
            ("tailwind.config.JSON", Some(SourceFormat::Json)),
            ("tw.yml", Some(SourceFormat::Yaml)),
            ("tailwind.config.toml", None),
            ("Makefile", None),
        ];
        for (name, expected) in cases {
            assert_eq!(SourceFormat::from_path(&PathBuf::from(name)), expected, "{}", name);
        }
    }

    #[test]
    fn test_json_error_position() {
        let err = SourceFormat::Json.parse("{\n  \"content\": [,]\n}").unwrap_err();
        assert_eq!(err.format, SourceFormat::Json);
        assert_eq!(err.line, 2);
        assert!(!err.message.contains(" at line "));
    }

    #[test]
    fn test_yaml_syntax_error() {
        let err = SourceFormat::Yaml
            .parse("content:\n  - a\n bad: [\n")
            .unwrap_err();
        assert_eq!(err.format, SourceFormat::Yaml);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_empty_yaml_is_null() {
        assert_eq!(SourceFormat::Yaml.parse("  \n").unwrap(), Literal::Null);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("YAML".parse::<SourceFormat>(), Ok(SourceFormat::Yaml));
        assert!("toml".parse::<SourceFormat>().is_err());
    }
}
