//! Output formatting for the command-line tool.

use crate::config::{ConfigDocument, DEFAULT_SHADE};
use crate::error::Issue;
use anyhow::Result;

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// Render a document in the requested format.
pub fn format_document(doc: &ConfigDocument, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_document_text(doc),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(doc)?;
            out.push('\n');
            out
        }
        OutputFormat::Yaml => serde_yaml::to_string(doc)?,
    })
}

/// Human-readable summary of a document.
pub fn format_document_text(doc: &ConfigDocument) -> String {
    let mut out = String::new();

    if let Some(source) = doc.source() {
        out.push_str(&format!("source: {}\n", source.display()));
    }

    let content = doc.content_config();
    out.push_str(&format!(
        "content ({}{}):\n",
        content.files.len(),
        if content.relative { ", relative to config" } else { "" }
    ));
    for pattern in &content.files {
        out.push_str(&format!("  {}\n", pattern));
    }

    let palette = doc.palette();
    if palette.is_empty() {
        out.push_str("colors: (none)\n");
    } else {
        out.push_str("colors:\n");
        for name in palette.family_names() {
            out.push_str(&format!("  {}:\n", name));
            if let Some(family) = palette.family(name) {
                for (shade, color) in family.shades() {
                    let label = if shade == DEFAULT_SHADE { "(default)" } else { shade };
                    out.push_str(&format!("    {:<12} {}\n", label, color));
                }
            }
        }
    }

    let theme = doc.theme();
    let groups: Vec<&str> = theme
        .tokens
        .keys()
        .chain(theme.extend.tokens.keys())
        .map(|k| k.as_str())
        .collect();
    if !groups.is_empty() {
        out.push_str(&format!("other theme keys: {}\n", groups.join(", ")));
    }

    if doc.plugins().is_empty() {
        out.push_str("plugins: (none)\n");
    } else {
        out.push_str("plugins:\n");
        for plugin in doc.plugins() {
            out.push_str(&format!("  {}\n", plugin));
        }
    }

    out
}

/// One `token value` line per extended color.
pub fn format_tokens(doc: &ConfigDocument) -> String {
    let tokens: Vec<(String, String)> = doc
        .tokens()
        .map(|(token, color)| (token, color.to_string()))
        .collect();
    let width = tokens.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
    tokens
        .iter()
        .map(|(token, color)| format!("{:<width$}  {}\n", token, color, width = width))
        .collect()
}

/// Bullet list of issues with their field paths.
pub fn format_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.field.is_empty() {
                format!("  - {}\n", issue.message)
            } else {
                format!("  - [{}] {}\n", issue.field, issue.message)
            }
        })
        .collect()
}
