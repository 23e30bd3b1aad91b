//! Integration tests for loading configuration documents.
//!
//! Covers the public surface an external build tool uses:
//! - ConfigDocument::load() across script, JSON and YAML sources
//! - content() / resolve_color() queries
//! - preset layering and discovery through ConfigLoader

use proptest::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use twconfig::config::{
    ConfigLoader, ConfigPaths, LoadOptions, PluginSource, SourceFormat, UnknownKeyBehavior,
};
use twconfig::error::{IssueKind, LookupError};
use twconfig::{ConfigDocument, ConfigError};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Write `contents` to `dir/name` and return the path.
fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write config file");
    path
}

/// Unwrap a validation failure, panicking on any other outcome.
fn validation_kinds(result: Result<ConfigDocument, ConfigError>) -> Vec<IssueKind> {
    match result {
        Err(ConfigError::Validation(err)) => err.issues.iter().map(|i| i.kind).collect(),
        Err(other) => panic!("expected a validation error, got {other}"),
        Ok(_) => panic!("expected a validation error, document loaded"),
    }
}

mod example_document {
    use super::*;

    #[test]
    fn test_content_patterns_in_order() {
        let doc = ConfigDocument::load(fixture("tailwind.config.js")).unwrap();
        assert_eq!(
            doc.content(),
            ["./index.html", "./src/**/*.{vue,js,ts,jsx,tsx}"]
        );
        assert!(!doc.content_config().relative);
    }

    #[test]
    fn test_resolve_telegram_shades() {
        let doc = ConfigDocument::load(fixture("tailwind.config.js")).unwrap();
        assert_eq!(doc.resolve_color("telegram", "primary").unwrap().as_str(), "#2AABEE");
        assert_eq!(doc.resolve_color("telegram", "secondary").unwrap().as_str(), "#229ED9");
        assert_eq!(doc.resolve_color("telegram", "bg").unwrap().as_str(), "#17212B");
        assert_eq!(doc.resolve_color("telegram", "hover").unwrap().as_str(), "#2C3847");
    }

    #[test]
    fn test_unknown_shade_and_family() {
        let doc = ConfigDocument::load(fixture("tailwind.config.js")).unwrap();
        assert_eq!(
            doc.resolve_color("telegram", "ghost"),
            Err(LookupError::UnknownShade {
                family: "telegram".into(),
                shade: "ghost".into()
            })
        );
        assert!(matches!(
            doc.resolve_color("discord", "primary"),
            Err(LookupError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn test_defaults_and_source() {
        let doc = ConfigDocument::load(fixture("tailwind.config.js")).unwrap();
        assert!(doc.plugins().is_empty());
        assert!(doc.theme().tokens.is_empty());
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.source(), Some(fixture("tailwind.config.js").as_path()));
    }

    #[test]
    fn test_all_formats_agree() {
        let js = ConfigDocument::load(fixture("tailwind.config.js")).unwrap();
        for name in ["tailwind.config.json", "tailwind.config.yaml", "tailwind.config.ts"] {
            let other = ConfigDocument::load(fixture(name)).unwrap();
            assert_eq!(other.content(), js.content(), "{name}");
            assert_eq!(other.palette(), js.palette(), "{name}");
        }
    }

    #[test]
    fn test_typescript_plugins() {
        let doc = ConfigDocument::load(fixture("tailwind.config.ts")).unwrap();
        let plugins = doc.plugins();
        assert_eq!(plugins.len(), 2);
        assert_eq!(
            plugins[0].source,
            PluginSource::Module("@tailwindcss/forms".into())
        );
        assert_eq!(plugins[1].name(), "@tailwindcss/typography");
        assert_eq!(
            plugins[1].options,
            Some(serde_json::json!({"className": "prose"}))
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let doc = std::sync::Arc::new(ConfigDocument::load(fixture("tailwind.config.yaml")).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let doc = doc.clone();
                std::thread::spawn(move || doc.resolve_color("telegram", "bg").unwrap().to_string())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "#17212B");
        }
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_empty_content_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "tailwind.config.js", "export default { content: [] }\n");
        assert_eq!(
            validation_kinds(ConfigDocument::load(&path)),
            vec![IssueKind::EmptyContent]
        );
    }

    #[test]
    fn test_missing_content_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "tailwind.config.json", r#"{"plugins": []}"#);
        assert_eq!(
            validation_kinds(ConfigDocument::load(&path)),
            vec![IssueKind::MissingField]
        );
    }

    #[test]
    fn test_bad_color_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            "tailwind.config.yaml",
            "content: ['./index.html']\ntheme:\n  extend:\n    colors:\n      telegram:\n        primary: notacolor\n",
        );
        let err = ConfigDocument::load(&path).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].field, "theme.extend.colors.telegram.primary");
        assert!(err.to_string().contains("notacolor"));
        assert!(err.to_string().contains("tailwind.config.yaml"));
    }

    #[test]
    fn test_duplicate_shade_fails_in_every_format() {
        let temp = TempDir::new().unwrap();
        let sources = [
            (
                "dup.config.js",
                "module.exports = { content: ['./a.html'], theme: { extend: { colors: { telegram: { bg: '#111', bg: '#222' } } } } }",
            ),
            (
                "dup.config.json",
                r##"{"content": ["./a.html"], "theme": {"extend": {"colors": {"telegram": {"bg": "#111", "bg": "#222"}}}}}"##,
            ),
            (
                "dup.config.yaml",
                "content: ['./a.html']\ntheme:\n  extend:\n    colors:\n      telegram:\n        bg: '#111'\n        bg: '#222'\n",
            ),
        ];
        for (name, text) in sources {
            let path = write_config(&temp, name, text);
            assert_eq!(
                validation_kinds(ConfigDocument::load(&path)),
                vec![IssueKind::DuplicateKey],
                "{name}"
            );
        }
    }

    #[test]
    fn test_spread_then_override_shade() {
        let text = "const base = { primary: '#111111', bg: '#17212B' }\n\
            export default { content: ['./a.html'], theme: { extend: { colors: { telegram: { ...base, primary: '#2AABEE' } } } } }";
        let doc = ConfigDocument::parse(text, SourceFormat::Script).unwrap();
        assert_eq!(doc.resolve_color("telegram", "primary").unwrap().as_str(), "#2AABEE");
        assert_eq!(doc.resolve_color("telegram", "bg").unwrap().as_str(), "#17212B");
        assert_eq!(doc.palette().family("telegram").unwrap().len(), 2);
    }

    #[test]
    fn test_spread_then_override_family() {
        let text = "const palette = { telegram: { primary: '#000000' }, brand: '#f00' }\n\
            export default { content: ['./a.html'], theme: { extend: { colors: { ...palette, telegram: { primary: '#2AABEE' } } } } }";
        let doc = ConfigDocument::parse(text, SourceFormat::Script).unwrap();
        assert_eq!(doc.palette().family_names(), vec!["telegram", "brand"]);
        assert_eq!(doc.resolve_color("telegram", "primary").unwrap().as_str(), "#2AABEE");
    }

    #[test]
    fn test_explicit_duplicate_after_spread_still_fails() {
        let text = "const base = { bg: '#111' }\n\
            export default { content: ['./a.html'], theme: { extend: { colors: { telegram: { ...base, bg: '#222', bg: '#333' } } } } }";
        assert_eq!(
            validation_kinds(ConfigDocument::parse(text, SourceFormat::Script)),
            vec![IssueKind::DuplicateKey]
        );
    }

    #[test]
    fn test_deeply_nested_script_is_parse_error() {
        let depth = 100_000;
        let text = format!(
            "export default {{ content: ['a'], x: {}{} }}",
            "[".repeat(depth),
            "]".repeat(depth)
        );
        assert!(matches!(
            ConfigDocument::parse(&text, SourceFormat::Script),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_all_issues_reported_together() {
        let doc = r##"{
            "content": [],
            "theme": {"extend": {"colors": {"brand": {"main": "blue", "dark": "#12"}}}},
            "plugins": [42]
        }"##;
        let kinds = match ConfigDocument::parse(doc, SourceFormat::Json) {
            Err(err) => err.issues().iter().map(|i| i.kind).collect::<Vec<_>>(),
            Ok(_) => panic!("expected failure"),
        };
        assert_eq!(
            kinds,
            vec![
                IssueKind::EmptyContent,
                IssueKind::InvalidColor,
                IssueKind::InvalidColor,
                IssueKind::WrongType
            ]
        );
    }

    #[test]
    fn test_unknown_key_policy() {
        let text = r#"{"content": ["./a.html"], "darkMode": "class"}"#;

        let doc = ConfigDocument::parse(text, SourceFormat::Json).unwrap();
        assert_eq!(doc.warnings().len(), 1);
        assert_eq!(doc.warnings()[0].kind, IssueKind::UnknownKey);

        let allow = ConfigLoader::new(LoadOptions {
            unknown_keys: UnknownKeyBehavior::Allow,
            format: None,
        });
        assert!(allow.load_str(text, SourceFormat::Json, None).unwrap().warnings().is_empty());

        let reject = ConfigLoader::new(LoadOptions {
            unknown_keys: UnknownKeyBehavior::Reject,
            format: None,
        });
        assert_eq!(
            validation_kinds(reject.load_str(text, SourceFormat::Json, None)),
            vec![IssueKind::UnknownKey]
        );
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "tailwind.config.js", "export default {\n  content: [\n}\n");
        match ConfigDocument::load(&path) {
            Err(ConfigError::Parse(err)) => {
                assert_eq!(err.format, SourceFormat::Script);
                assert_eq!(err.path.as_deref(), Some(path.as_path()));
                assert_eq!(err.line, 3);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = ConfigDocument::load(temp.path().join("absent.config.js")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

mod loading {
    use super::*;

    #[test]
    fn test_discover_prefers_script_over_json() {
        let temp = TempDir::new().unwrap();
        write_config(&temp, "tailwind.config.json", r#"{"content": ["./from-json.html"]}"#);
        write_config(&temp, "tailwind.config.js", "export default { content: ['./from-js.html'] }");

        let paths = ConfigPaths::with_dirs(temp.path(), None);
        let doc = ConfigLoader::default().discover(&paths).unwrap();
        assert_eq!(doc.content(), ["./from-js.html"]);
    }

    #[test]
    fn test_discover_explicit_path() {
        let temp = TempDir::new().unwrap();
        let explicit = write_config(&temp, "styles.yml", "content: ['./explicit.html']\n");
        write_config(&temp, "tailwind.config.js", "export default { content: ['./probed.html'] }");

        let paths = ConfigPaths::with_dirs(temp.path(), Some(explicit));
        let doc = ConfigLoader::default().discover(&paths).unwrap();
        assert_eq!(doc.content(), ["./explicit.html"]);
    }

    #[test]
    fn test_discover_nothing_found() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(temp.path(), None);
        let err = ConfigLoader::default().discover(&paths).unwrap_err();
        assert!(err.to_string().contains("no configuration file found"));
    }

    #[test]
    fn test_format_override() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "tailwind.conf", r#"{"content": ["./a.html"]}"#);
        let loader = ConfigLoader::new(LoadOptions {
            unknown_keys: UnknownKeyBehavior::Warn,
            format: Some(SourceFormat::Json),
        });
        assert_eq!(loader.load(&path).unwrap().content(), ["./a.html"]);
    }

    #[test]
    fn test_preset_layering() {
        let temp = TempDir::new().unwrap();
        write_config(
            &temp,
            "brand.preset.json",
            r##"{"theme": {"extend": {"colors": {"telegram": {"primary": "#000000", "bg": "#17212B"}}}}, "plugins": ["@tailwindcss/forms"]}"##,
        );
        let path = write_config(
            &temp,
            "tailwind.config.js",
            "module.exports = {\n  presets: [require('./brand.preset.json')],\n  content: ['./index.html'],\n  theme: { extend: { colors: { telegram: { primary: '#2AABEE' } } } },\n}\n",
        );

        let doc = ConfigDocument::load(&path).unwrap();
        assert_eq!(doc.resolve_color("telegram", "primary").unwrap().as_str(), "#2AABEE");
        assert_eq!(doc.resolve_color("telegram", "bg").unwrap().as_str(), "#17212B");
        assert_eq!(doc.plugins()[0].name(), "@tailwindcss/forms");
    }

    #[test]
    fn test_preset_cycle() {
        let temp = TempDir::new().unwrap();
        write_config(&temp, "a.json", r#"{"presets": ["./b.json"], "content": ["./a.html"]}"#);
        write_config(&temp, "b.json", r#"{"presets": ["./a.json"]}"#);

        let err = ConfigDocument::load(temp.path().join("a.json")).unwrap_err();
        assert_eq!(err.issues()[0].kind, IssueKind::PresetCycle);
    }

    #[test]
    fn test_package_preset_rejected() {
        let text = r#"{"presets": ["@acme/tailwind-preset"], "content": ["./a.html"]}"#;
        assert_eq!(
            validation_kinds(ConfigDocument::parse(text, SourceFormat::Json)),
            vec![IssueKind::PresetNotFile]
        );
    }
}

proptest! {
    #[test]
    fn prop_hex_colors_round_trip(color in "#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})") {
        let text = format!(
            "export default {{ content: ['./a.html'], theme: {{ extend: {{ colors: {{ brand: {{ main: '{}' }} }} }} }} }}",
            color
        );
        let doc = ConfigDocument::parse(&text, SourceFormat::Script).unwrap();
        prop_assert_eq!(doc.resolve_color("brand", "main").unwrap().as_str(), color.as_str());
    }
}
