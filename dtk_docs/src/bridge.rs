//! Read-only documentation queries
//!
//! Everything is loaded once up front. Missing or broken inputs leave the
//! matching query empty and are recorded in `load_warnings`; no query ever
//! returns an error.

use crate::config::DocsConfig;
use crate::error::DocsError;
use crate::examples::{load_examples, UsageExample};
use crate::manifest::{load_manifest, ComponentManifestEntry};
use crate::swatches::{color_swatches, ColorSwatch};
use chrono::{DateTime, Utc};
use dtk_compiler::logging::codes;
use dtk_compiler::references::resolve;
use dtk_compiler::store::{FileDocument, TokenLayer, TokenStore};
use dtk_compiler::{log_debug, log_success};
use dtk_compiler::{ProjectConfig, ResolvedTokenSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

pub const PLACEHOLDER_TEXT: &str = "No documentation data yet for this component.";

/// What a documentation page renders for one slug
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ManifestView<'a> {
    Entry(&'a ComponentManifestEntry),
    Placeholder { slug: String, message: &'static str },
}

impl ManifestView<'_> {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ManifestView::Placeholder { .. })
    }
}

impl fmt::Display for ManifestView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestView::Entry(entry) => {
                writeln!(f, "{} ({})", entry.name, entry.slug)?;
                if !entry.description.is_empty() {
                    writeln!(f, "{}", entry.description)?;
                }
                Ok(())
            }
            ManifestView::Placeholder { slug, message } => writeln!(f, "{}: {}", slug, message),
        }
    }
}

/// One row of a props table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropRow {
    pub name: String,
    pub type_label: String,
    pub default: String,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct DocsBridge {
    manifest: BTreeMap<String, ComponentManifestEntry>,
    examples: Vec<UsageExample>,
    swatches: Vec<ColorSwatch>,
    loaded_at: DateTime<Utc>,
    warnings: Vec<String>,
}

impl DocsBridge {
    /// Load documentation inputs; `primitive` is the resolved primitive layer
    /// swatches are drawn from
    pub fn load(config: &DocsConfig, primitive: Option<&ResolvedTokenSet>) -> Self {
        let start = Instant::now();
        let mut problems: Vec<DocsError> = Vec::new();

        let mut manifest = BTreeMap::new();
        match &config.manifest {
            Some(path) => {
                let (entries, manifest_problems) = load_manifest(path);
                problems.extend(manifest_problems);
                for entry in entries {
                    if manifest.contains_key(&entry.slug) {
                        problems.push(DocsError::manifest_malformed(
                            path,
                            format!("duplicate slug '{}' for component '{}'", entry.slug, entry.name),
                        ));
                        continue;
                    }
                    manifest.insert(entry.slug.clone(), entry);
                }
            }
            None => log_debug!("No component manifest configured"),
        }

        let examples = match &config.examples {
            Some(path) => {
                let (examples, example_problems) = load_examples(path);
                problems.extend(example_problems);
                examples
            }
            None => Vec::new(),
        };

        let swatches = match primitive {
            Some(set) => {
                let swatches = color_swatches(set, &config.color_group, &config.custom_property_prefix);
                if swatches.is_empty() {
                    problems.push(DocsError::SwatchesUnavailable {
                        reason: format!("primitive layer has no '{}' group", config.color_group),
                    });
                }
                swatches
            }
            None => {
                problems.push(DocsError::SwatchesUnavailable {
                    reason: "primitive layer not available".to_string(),
                });
                Vec::new()
            }
        };

        let warnings: Vec<String> = problems.iter().map(DocsError::report).collect();

        log_success!(codes::success::DOCS_LOADED, "Documentation data loaded",
            "components" => manifest.len(),
            "examples" => examples.len(),
            "swatches" => swatches.len(),
            "warnings" => warnings.len(),
            "duration_ms" => start.elapsed().as_millis());

        Self {
            manifest,
            examples,
            swatches,
            loaded_at: Utc::now(),
            warnings,
        }
    }

    /// Load using a project's docs section, resolving its primitive layer
    /// independently of any build
    pub fn from_project(project: &ProjectConfig) -> Self {
        let primitive = project.layer_source(TokenLayer::Primitive).and_then(|path| {
            let store = TokenStore::new().with_source(TokenLayer::Primitive, FileDocument::new(path));
            let node = store.load(TokenLayer::Primitive).ok()?;
            resolve(&[(TokenLayer::Primitive, node)]).ok()
        });
        Self::load(&DocsConfig::from_project(project), primitive.as_ref())
    }

    pub fn empty() -> Self {
        Self {
            manifest: BTreeMap::new(),
            examples: Vec::new(),
            swatches: Vec::new(),
            loaded_at: Utc::now(),
            warnings: Vec::new(),
        }
    }

    pub fn get_manifest_entry(&self, slug: &str) -> Option<&ComponentManifestEntry> {
        self.manifest.get(slug)
    }

    /// Examples whose solution names `name`, in document order
    pub fn get_examples_for_component(&self, name: &str) -> Vec<&UsageExample> {
        self.examples
            .iter()
            .filter(|example| example.demonstrates(name))
            .collect()
    }

    pub fn color_swatches(&self) -> &[ColorSwatch] {
        &self.swatches
    }

    pub fn lookup_or_placeholder(&self, slug: &str) -> ManifestView<'_> {
        match self.get_manifest_entry(slug) {
            Some(entry) => ManifestView::Entry(entry),
            None => ManifestView::Placeholder {
                slug: slug.to_string(),
                message: PLACEHOLDER_TEXT,
            },
        }
    }

    /// Rows for a props table; empty for an unknown slug
    pub fn props_table(&self, slug: &str) -> Vec<PropRow> {
        let Some(entry) = self.get_manifest_entry(slug) else {
            return Vec::new();
        };
        entry
            .props
            .iter()
            .map(|prop| PropRow {
                name: prop.name.clone(),
                type_label: prop.type_label.clone(),
                default: prop.default_label().unwrap_or_else(|| "-".to_string()),
                required: prop.required,
                description: prop.description.clone(),
            })
            .collect()
    }

    /// Every known slug, sorted
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.manifest.keys().map(String::as_str)
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtk_compiler::store::parser::parse_document;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const EXAMPLES: &str = r#"{"examples": [
        {"title": "Primary action", "solution": {"component": "Button"}},
        {"title": "Search form", "solution": {"components": ["Button", "Input"]}},
        {"title": "Profile card", "solution": {"component": "Card"}}
    ]}"#;

    const MANIFEST: &str = r#"{"components": [
        {"name": "Button", "description": "Triggers an action", "props": [
            {"name": "variant", "type": "'primary' | 'secondary'", "default": "primary", "description": "Visual style"},
            {"name": "disabled", "type": "boolean", "default": false},
            {"name": "onClick", "type": "() => void", "required": true}
        ]},
        {"name": "IconButton"}
    ]}"#;

    fn primitive() -> ResolvedTokenSet {
        let node = parse_document(
            r##"{"color": {"blue": {"500": {"$value": "#3b82f6"}}, "black": {"$value": "#000000"}}}"##,
            "primitive",
            false,
        )
        .unwrap();
        resolve(&[(TokenLayer::Primitive, node)]).unwrap()
    }

    fn bridge() -> (DocsBridge, TempDir) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("manifest.json"), MANIFEST).unwrap();
        fs::write(dir.path().join("examples.json"), EXAMPLES).unwrap();
        let config = DocsConfig::new()
            .with_manifest(dir.path().join("manifest.json"))
            .with_examples(dir.path().join("examples.json"));
        (DocsBridge::load(&config, Some(&primitive())), dir)
    }

    #[test]
    fn test_examples_match_single_and_list_fields() {
        let (bridge, _dir) = bridge();

        let titles: Vec<&str> = bridge
            .get_examples_for_component("Button")
            .iter()
            .map(|example| example.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Primary action", "Search form"]);
        assert!(bridge.get_examples_for_component("Tooltip").is_empty());
    }

    #[test]
    fn test_unknown_slug_gives_placeholder() {
        let (bridge, _dir) = bridge();

        assert!(bridge.get_manifest_entry("tooltip").is_none());
        let view = bridge.lookup_or_placeholder("tooltip");
        assert!(view.is_placeholder());
        assert_eq!(view.to_string(), format!("tooltip: {}\n", PLACEHOLDER_TEXT));

        let view = bridge.lookup_or_placeholder("icon-button");
        assert_eq!(view, ManifestView::Entry(&bridge.manifest["icon-button"]));
    }

    #[test]
    fn test_props_table() {
        let (bridge, _dir) = bridge();
        let rows = bridge.props_table("button");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].default, "primary");
        assert_eq!(rows[1].default, "false");
        assert_eq!(rows[2].default, "-");
        assert!(rows[2].required);
        assert!(bridge.props_table("missing").is_empty());
    }

    #[test]
    fn test_swatches_and_clean_load() {
        let (bridge, _dir) = bridge();
        let names: Vec<&str> = bridge.color_swatches().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["color-black", "color-blue-500"]);
        assert!(bridge.load_warnings().is_empty());
        assert_eq!(bridge.slugs().collect::<Vec<_>>(), vec!["button", "icon-button"]);
    }

    #[test]
    fn test_swatch_group_and_prefix_follow_config() {
        let config = DocsConfig::new().with_color_group("color.blue").with_prefix("ds");
        let bridge = DocsBridge::load(&config, Some(&primitive()));

        let swatches = bridge.color_swatches();
        assert_eq!(swatches.len(), 1);
        assert_eq!(swatches[0].css_variable, "--ds-color-blue-500");
        assert_eq!(swatches[0].value, "#3b82f6");
    }

    #[test]
    fn test_missing_inputs_fail_soft() {
        let dir = tempdir().unwrap();
        let config = DocsConfig::new()
            .with_manifest(dir.path().join("nope.json"))
            .with_examples(dir.path().join("nope-examples.json"));
        let bridge = DocsBridge::load(&config, None);

        assert!(bridge.get_manifest_entry("button").is_none());
        assert!(bridge.get_examples_for_component("Button").is_empty());
        assert!(bridge.color_swatches().is_empty());
        assert_eq!(bridge.load_warnings().len(), 3);
    }

    #[test]
    fn test_duplicate_slugs_keep_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"components": [{"name": "Button", "description": "first"}, {"name": "button", "description": "second"}]}"#,
        )
        .unwrap();
        let bridge = DocsBridge::load(&DocsConfig::new().with_manifest(&path), Some(&primitive()));

        assert_eq!(bridge.get_manifest_entry("button").unwrap().description, "first");
        assert_eq!(bridge.load_warnings().len(), 1);
    }

    #[test]
    fn test_from_project() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("primitive.json"),
            r##"{"color": {"white": {"$value": "#ffffff"}}}"##,
        )
        .unwrap();
        fs::write(dir.path().join("examples.json"), EXAMPLES).unwrap();
        fs::write(
            dir.path().join("tokens.toml"),
            "[layers]\nprimitive = \"primitive.json\"\n\n[docs]\nexamples = \"examples.json\"\n",
        )
        .unwrap();

        let project = ProjectConfig::load(dir.path().join("tokens.toml")).unwrap();
        let bridge = DocsBridge::from_project(&project);
        assert_eq!(bridge.color_swatches().len(), 1);
        assert_eq!(bridge.get_examples_for_component("Card").len(), 1);
    }
}
