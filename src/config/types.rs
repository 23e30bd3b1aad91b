//! Configuration types and structures.
//!
//! [`ConfigDocument`] is the validated, immutable form of a configuration
//! file. It is only produced by the validator, so holding one means every
//! invariant (non-empty content, valid colors, unique keys) already holds.

use super::loader::ConfigLoader;
use super::source::SourceFormat;
use crate::error::{ConfigResult, Issue, LookupError};
use indexmap::IndexMap;
use regex_lite::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Shade name used when a color family is written as a single value.
pub const DEFAULT_SHADE: &str = "DEFAULT";

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
});

/// Behavior for top-level keys the schema does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyBehavior {
    /// Ignore silently.
    Allow,
    /// Ignore, but record a warning on the document (default).
    #[default]
    Warn,
    /// Fail validation.
    Reject,
}

/// A color written as `#RGB` or `#RRGGBB`, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Parse a hex color, returning `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        HEX_COLOR.is_match(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The red, green and blue channels. `#abc` expands to `#aabbcc`.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let digits = &self.0[1..];
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        if digits.len() == 3 {
            let nibble = |i: usize| channel(&digits[i..i + 1]) * 17;
            (nibble(0), nibble(1), nibble(2))
        } else {
            (channel(&digits[0..2]), channel(&digits[2..4]), channel(&digits[4..6]))
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shades of one color family, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorFamily {
    shades: IndexMap<String, HexColor>,
}

impl ColorFamily {
    pub(crate) fn from_shades(shades: IndexMap<String, HexColor>) -> Self {
        Self { shades }
    }

    pub fn get(&self, shade: &str) -> Option<&HexColor> {
        self.shades.get(shade)
    }

    /// Iterate `(shade, color)` pairs in declaration order.
    pub fn shades(&self) -> impl Iterator<Item = (&str, &HexColor)> {
        self.shades.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.shades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shades.is_empty()
    }
}

/// Color families added by `theme.extend.colors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorPalette {
    families: IndexMap<String, ColorFamily>,
}

impl ColorPalette {
    pub(crate) fn from_families(families: IndexMap<String, ColorFamily>) -> Self {
        Self { families }
    }

    pub fn family(&self, name: &str) -> Option<&ColorFamily> {
        self.families.get(name)
    }

    /// Family names in declaration order.
    pub fn family_names(&self) -> Vec<&str> {
        self.families.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Look up `family.shade`.
    pub fn resolve(&self, family: &str, shade: &str) -> Result<&HexColor, LookupError> {
        let colors = self
            .families
            .get(family)
            .ok_or_else(|| LookupError::UnknownFamily {
                family: family.to_string(),
            })?;
        colors.get(shade).ok_or_else(|| LookupError::UnknownShade {
            family: family.to_string(),
            shade: shade.to_string(),
        })
    }

    /// Flatten into `(token, color)` pairs: `family-shade`, or `family` for the default shade.
    pub fn tokens(&self) -> impl Iterator<Item = (String, &HexColor)> {
        self.families.iter().flat_map(|(family, colors)| {
            colors.shades().map(move |(shade, color)| {
                let token = if shade == DEFAULT_SHADE {
                    family.clone()
                } else {
                    format!("{}-{}", family, shade)
                };
                (token, color)
            })
        })
    }
}

/// Additive design-token overrides (`theme.extend`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeExtend {
    #[serde(skip_serializing_if = "ColorPalette::is_empty")]
    pub colors: ColorPalette,
    /// Other token groups (spacing, fontFamily, ...), kept as static data.
    #[serde(flatten)]
    pub tokens: IndexMap<String, Value>,
}

/// The `theme` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Theme {
    pub extend: ThemeExtend,
    /// Keys that replace default token groups outright, kept as static data.
    #[serde(flatten)]
    pub tokens: IndexMap<String, Value>,
}

/// Which files the external scanner reads for class names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentConfig {
    pub files: Vec<String>,
    /// Resolve patterns against the config file's directory instead of the working directory.
    pub relative: bool,
}

/// Where a plugin comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginSource {
    /// A module specifier such as `@tailwindcss/forms`.
    Module(String),
    /// A named value whose origin the config does not reveal.
    Binding(String),
}

/// A plugin listed in `plugins`. Never loaded or executed here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRef {
    #[serde(flatten)]
    pub source: PluginSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl PluginRef {
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            source: PluginSource::Module(name.into()),
            options: None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.source {
            PluginSource::Module(name) | PluginSource::Binding(name) => name,
        }
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            PluginSource::Module(name) => write!(f, "{}", name)?,
            PluginSource::Binding(name) => write!(f, "<{}>", name)?,
        }
        if self.options.is_some() {
            write!(f, " (with options)")?;
        }
        Ok(())
    }
}

/// A loaded, validated configuration. Immutable; share it by reference or `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
    content: ContentConfig,
    theme: Theme,
    plugins: Vec<PluginRef>,
    #[serde(skip)]
    warnings: Vec<Issue>,
}

impl ConfigDocument {
    pub(crate) fn new(
        content: ContentConfig,
        theme: Theme,
        plugins: Vec<PluginRef>,
        warnings: Vec<Issue>,
    ) -> Self {
        Self {
            source: None,
            content,
            theme,
            plugins,
            warnings,
        }
    }

    pub(crate) fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Load and validate a configuration file with default options.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        ConfigLoader::default().load(path)
    }

    /// Parse and validate configuration text that is not backed by a file.
    pub fn parse(text: &str, format: SourceFormat) -> ConfigResult<Self> {
        ConfigLoader::default().load_str(text, format, None)
    }

    /// Content glob patterns, unchanged and in declaration order.
    pub fn content(&self) -> &[String] {
        &self.content.files
    }

    pub fn content_config(&self) -> &ContentConfig {
        &self.content
    }

    /// Directory the content patterns are rooted at.
    pub fn content_base(&self, cwd: &Path) -> PathBuf {
        match (self.content.relative, self.source.as_deref().and_then(Path::parent)) {
            (true, Some(dir)) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => cwd.to_path_buf(),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The extended color palette (`theme.extend.colors`).
    pub fn palette(&self) -> &ColorPalette {
        &self.theme.extend.colors
    }

    /// Resolve `theme.extend.colors[family][shade]`.
    pub fn resolve_color(&self, family: &str, shade: &str) -> Result<&HexColor, LookupError> {
        self.palette().resolve(family, shade)
    }

    /// Color tokens of the extended palette in declaration order.
    pub fn tokens(&self) -> impl Iterator<Item = (String, &HexColor)> {
        self.palette().tokens()
    }

    pub fn plugins(&self) -> &[PluginRef] {
        &self.plugins
    }

    /// File the document was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Non-fatal findings (unknown keys under the warn policy, absolute patterns).
    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }
}
