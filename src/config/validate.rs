//! Schema validation from a [`Literal`] tree to a [`ConfigDocument`].
//!
//! Recognized top-level keys:
//!
//! | Key       | Type                                  | Required | Default |
//! |-----------|---------------------------------------|----------|---------|
//! | `content` | array of globs, or `{ files, relative }` | yes   | -       |
//! | `theme`   | object; `extend.colors` is typed      | no       | `{}`    |
//! | `plugins` | array of plugin references            | no       | `[]`    |
//! | `presets` | array of preset paths (applied by the loader) | no | `[]` |
//!
//! Validation never stops at the first problem: every issue is collected so a
//! single run reports everything wrong with the file.

use super::literal::Literal;
use super::types::{
    ColorFamily, ColorPalette, ConfigDocument, ContentConfig, DEFAULT_SHADE, HexColor,
    PluginRef, PluginSource, Theme, ThemeExtend, UnknownKeyBehavior,
};
use crate::error::{Issue, IssueKind, ValidationError};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Top-level keys the schema understands.
pub const RECOGNIZED_KEYS: &[&str] = &["content", "theme", "plugins", "presets"];

/// Validates literal trees against the configuration schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    unknown_keys: UnknownKeyBehavior,
}

impl Validator {
    pub fn new(unknown_keys: UnknownKeyBehavior) -> Self {
        Self { unknown_keys }
    }

    /// Validate a parsed document, returning every issue on failure.
    pub fn validate(&self, root: &Literal) -> Result<ConfigDocument, ValidationError> {
        let mut checker = Checker {
            unknown_keys: self.unknown_keys,
            issues: Vec::new(),
            warnings: Vec::new(),
        };

        let empty = Literal::Object(Vec::new());
        let root = match root {
            Literal::Null => &empty,
            Literal::Object(_) => root,
            other => {
                return Err(ValidationError::single(Issue::new(
                    IssueKind::WrongType,
                    "",
                    format!("configuration must be an object, found {}", other.kind()),
                )));
            }
        };

        checker.duplicates("", root);
        let content = checker.content(root.get("content"));
        let theme = checker.theme(root.get("theme"));
        let plugins = checker.plugins(root.get("plugins"));
        checker.unknown(root, "", RECOGNIZED_KEYS);

        if !checker.issues.is_empty() {
            return Err(ValidationError::new(checker.issues));
        }
        let Some(content) = content else {
            return Err(ValidationError::single(Issue::missing_field("content")));
        };

        debug!(
            patterns = content.files.len(),
            families = theme.extend.colors.family_names().len(),
            plugins = plugins.len(),
            "configuration validated"
        );
        Ok(ConfigDocument::new(content, theme, plugins, checker.warnings))
    }
}

struct Checker {
    unknown_keys: UnknownKeyBehavior,
    issues: Vec<Issue>,
    warnings: Vec<Issue>,
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

impl Checker {
    /// Report each key that appears more than once in an object.
    fn duplicates(&mut self, field: &str, object: &Literal) {
        let Some(entries) = object.as_object() else {
            return;
        };
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (key, _) in entries {
            *counts.entry(key.as_str()).or_default() += 1;
        }
        let mut seen = Vec::new();
        for (key, _) in entries {
            if counts[key.as_str()] > 1 && !seen.contains(&key) {
                self.issues.push(Issue::duplicate_key(field, key));
                seen.push(key);
            }
        }
    }

    fn unknown(&mut self, object: &Literal, field: &str, known: &[&str]) {
        let Some(entries) = object.as_object() else {
            return;
        };
        for (key, _) in entries {
            if known.contains(&key.as_str()) {
                continue;
            }
            let path = join(field, key);
            let message = format!("unknown key '{}' (recognized: {})", path, known.join(", "));
            match self.unknown_keys {
                UnknownKeyBehavior::Allow => {}
                UnknownKeyBehavior::Warn => {
                    debug!(key = %path, "ignoring unknown configuration key");
                    self.warnings.push(Issue::new(IssueKind::UnknownKey, path, message));
                }
                UnknownKeyBehavior::Reject => {
                    self.issues.push(Issue::new(IssueKind::UnknownKey, path, message));
                }
            }
        }
    }

    fn content(&mut self, value: Option<&Literal>) -> Option<ContentConfig> {
        match value {
            None | Some(Literal::Null) => {
                self.issues.push(Issue::missing_field("content"));
                None
            }
            Some(Literal::Array(items)) => Some(ContentConfig {
                files: self.patterns("content", items),
                relative: false,
            }),
            Some(object @ Literal::Object(_)) => {
                self.duplicates("content", object);
                self.unknown(object, "content", &["files", "relative"]);
                let relative = match object.get("relative") {
                    None | Some(Literal::Null) => false,
                    Some(Literal::Bool(b)) => *b,
                    Some(other) => {
                        self.issues
                            .push(Issue::wrong_type("content.relative", "a boolean", other.kind()));
                        false
                    }
                };
                let files = match object.get("files") {
                    Some(Literal::Array(items)) => self.patterns("content.files", items),
                    None | Some(Literal::Null) => {
                        self.issues.push(Issue::missing_field("content.files"));
                        return None;
                    }
                    Some(other) => {
                        self.issues
                            .push(Issue::wrong_type("content.files", "an array", other.kind()));
                        return None;
                    }
                };
                Some(ContentConfig { files, relative })
            }
            Some(other) => {
                self.issues.push(Issue::wrong_type(
                    "content",
                    "an array of glob patterns",
                    other.kind(),
                ));
                None
            }
        }
    }

    fn patterns(&mut self, field: &str, items: &[Literal]) -> Vec<String> {
        if items.is_empty() {
            self.issues.push(Issue::new(
                IssueKind::EmptyContent,
                field,
                format!("{} must list at least one glob pattern", field),
            ));
            return Vec::new();
        }

        let mut files = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let path = format!("{}[{}]", field, idx);
            let Some(pattern) = item.as_str() else {
                self.issues.push(Issue::wrong_type(&path, "a glob string", item.kind()));
                continue;
            };
            let glob = pattern.strip_prefix('!').unwrap_or(pattern);
            if glob.trim().is_empty() {
                self.issues.push(Issue::new(
                    IssueKind::InvalidPattern,
                    &path,
                    format!("{} must not be empty", path),
                ));
                continue;
            }
            if let Err(e) = globset::Glob::new(glob) {
                self.issues.push(Issue::new(
                    IssueKind::InvalidPattern,
                    &path,
                    format!("invalid glob '{}': {}", pattern, e.kind()),
                ));
                continue;
            }
            if Path::new(glob).is_absolute() {
                debug!(pattern = %pattern, "absolute content pattern");
                self.warnings.push(Issue::new(
                    IssueKind::InvalidPattern,
                    &path,
                    format!("'{}' is absolute; content patterns are normally project-relative", pattern),
                ));
            }
            files.push(pattern.to_string());
        }
        files
    }

    fn theme(&mut self, value: Option<&Literal>) -> Theme {
        let object = match value {
            None | Some(Literal::Null) => return Theme::default(),
            Some(object @ Literal::Object(_)) => object,
            Some(other) => {
                self.issues.push(Issue::wrong_type("theme", "an object", other.kind()));
                return Theme::default();
            }
        };
        self.duplicates("theme", object);

        let mut theme = Theme::default();
        for (key, value) in first_entries(object) {
            if key == "extend" {
                theme.extend = self.extend(value);
            } else if let Some(token) = self.token(&join("theme", key), value) {
                theme.tokens.insert(key.to_string(), token);
            }
        }
        theme
    }

    fn extend(&mut self, value: &Literal) -> ThemeExtend {
        let object = match value {
            Literal::Null => return ThemeExtend::default(),
            Literal::Object(_) => value,
            other => {
                self.issues
                    .push(Issue::wrong_type("theme.extend", "an object", other.kind()));
                return ThemeExtend::default();
            }
        };
        self.duplicates("theme.extend", object);

        let mut extend = ThemeExtend::default();
        for (key, value) in first_entries(object) {
            if key == "colors" {
                extend.colors = self.palette(value);
            } else if let Some(token) = self.token(&join("theme.extend", key), value) {
                extend.tokens.insert(key.to_string(), token);
            }
        }
        extend
    }

    /// Opaque token group: any static data is accepted.
    fn token(&mut self, field: &str, value: &Literal) -> Option<Value> {
        let json = value.to_json();
        if json.is_none() {
            self.issues.push(Issue::wrong_type(
                field,
                "static data",
                "an identifier or call expression",
            ));
        }
        json
    }

    fn palette(&mut self, value: &Literal) -> ColorPalette {
        const FIELD: &str = "theme.extend.colors";
        let object = match value {
            Literal::Null => return ColorPalette::default(),
            Literal::Object(_) => value,
            other => {
                self.issues.push(Issue::wrong_type(FIELD, "an object", other.kind()));
                return ColorPalette::default();
            }
        };
        self.duplicates(FIELD, object);

        let mut families = IndexMap::new();
        for (family, value) in first_entries(object) {
            let field = join(FIELD, family);
            let mut shades = IndexMap::new();
            match value {
                Literal::String(color) => {
                    if let Some(color) = self.color(&field, color) {
                        shades.insert(DEFAULT_SHADE.to_string(), color);
                    }
                }
                Literal::Object(_) => {
                    self.duplicates(&field, value);
                    for (shade, color) in first_entries(value) {
                        let shade_field = join(&field, shade);
                        match color {
                            Literal::String(color) => {
                                if let Some(color) = self.color(&shade_field, color) {
                                    shades.insert(shade.to_string(), color);
                                }
                            }
                            other => self.issues.push(Issue::wrong_type(
                                &shade_field,
                                "a hex color string",
                                other.kind(),
                            )),
                        }
                    }
                }
                other => {
                    self.issues.push(Issue::wrong_type(
                        &field,
                        "a hex color or an object of shades",
                        other.kind(),
                    ));
                    continue;
                }
            }
            families.insert(family.to_string(), ColorFamily::from_shades(shades));
        }
        ColorPalette::from_families(families)
    }

    fn color(&mut self, field: &str, value: &str) -> Option<HexColor> {
        let color = HexColor::parse(value);
        if color.is_none() {
            self.issues.push(Issue::invalid_color(field, value));
        }
        color
    }

    fn plugins(&mut self, value: Option<&Literal>) -> Vec<PluginRef> {
        match value {
            None | Some(Literal::Null) => Vec::new(),
            Some(Literal::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| self.plugin(&format!("plugins[{}]", idx), item))
                .collect(),
            Some(other) => {
                self.issues
                    .push(Issue::wrong_type("plugins", "an array", other.kind()));
                Vec::new()
            }
        }
    }

    fn plugin(&mut self, field: &str, value: &Literal) -> Option<PluginRef> {
        if let Some(spec) = value.as_require() {
            return Some(PluginRef::module(spec));
        }
        match value {
            Literal::String(name) if !name.trim().is_empty() => Some(PluginRef::module(name.as_str())),
            Literal::Ident(name) => Some(PluginRef {
                source: PluginSource::Binding(name.clone()),
                options: None,
            }),
            Literal::Call { callee, args } => {
                let mut plugin = self.plugin(field, callee)?;
                plugin.options = match args.as_slice() {
                    [] => None,
                    [options] => Some(self.plugin_options(field, options)?),
                    _ => {
                        self.issues.push(Issue::new(
                            IssueKind::WrongType,
                            field,
                            format!("{} must take at most one options argument", field),
                        ));
                        return None;
                    }
                };
                Some(plugin)
            }
            Literal::Object(_) => {
                // Data form used by YAML/JSON sources: `{ name, options }`.
                self.duplicates(field, value);
                let name = match value.get("name") {
                    Some(Literal::String(name)) if !name.trim().is_empty() => name.clone(),
                    Some(other) => {
                        self.issues
                            .push(Issue::wrong_type(&join(field, "name"), "a module name", other.kind()));
                        return None;
                    }
                    None => {
                        self.issues.push(Issue::missing_field(&join(field, "name")));
                        return None;
                    }
                };
                let options = match value.get("options") {
                    None | Some(Literal::Null) => None,
                    Some(options) => Some(self.plugin_options(field, options)?),
                };
                self.unknown(value, field, &["name", "options"]);
                Some(PluginRef {
                    source: PluginSource::Module(name),
                    options,
                })
            }
            other => {
                self.issues.push(Issue::wrong_type(
                    field,
                    "a module name or plugin reference",
                    other.kind(),
                ));
                None
            }
        }
    }

    fn plugin_options(&mut self, field: &str, options: &Literal) -> Option<Value> {
        let json = options.to_json();
        if json.is_none() {
            self.issues.push(Issue::wrong_type(
                &join(field, "options"),
                "static data",
                "an identifier or call expression",
            ));
        }
        json
    }
}

/// Object entries with later duplicates dropped (duplicates are reported separately).
fn first_entries(object: &Literal) -> impl Iterator<Item = (&str, &Literal)> {
    let entries = object.as_object().unwrap_or_default();
    entries.iter().enumerate().filter_map(move |(idx, (key, value))| {
        let first = entries[..idx].iter().all(|(k, _)| k != key);
        first.then_some((key.as_str(), value))
    })
}
