//! Component manifest documents
//!
//! A manifest is either one `{"components": [...]}` document or a directory
//! holding one JSON file per component. Entries without a slug get the
//! kebab-cased component name.

use crate::error::DocsError;
use dtk_compiler::config::compile_time::docs::{MAX_MANIFEST_ENTRIES, MAX_MANIFEST_FILES};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropDescriptor {
    pub name: String,
    #[serde(rename = "type", default = "unknown_type")]
    pub type_label: String,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

impl PropDescriptor {
    /// Default value as shown in a props table; strings lose their quotes
    pub fn default_label(&self) -> Option<String> {
        self.default.as_ref().map(|value| match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentManifestEntry {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub props: Vec<PropDescriptor>,
    /// Usage snippets
    #[serde(default)]
    pub usage: Vec<String>,
}

impl ComponentManifestEntry {
    fn normalized(mut self) -> Self {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        }
        self
    }

    pub fn required_props(&self) -> impl Iterator<Item = &PropDescriptor> {
        self.props.iter().filter(|prop| prop.required)
    }
}

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    components: Vec<ComponentManifestEntry>,
}

fn word_boundary() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("word boundary pattern is valid"))
}

fn separator_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"))
}

/// `IconButton` -> `icon-button`, `Date Picker` -> `date-picker`
pub fn slugify(name: &str) -> String {
    let split = word_boundary().replace_all(name, "${1}-${2}");
    let lower = split.to_lowercase();
    let joined = separator_run().replace_all(&lower, "-");
    joined.trim_matches('-').to_string()
}

/// Entries from a file or directory, plus every problem met on the way.
/// A missing or unreadable source yields no entries, never an error.
pub(crate) fn load_manifest(path: &Path) -> (Vec<ComponentManifestEntry>, Vec<DocsError>) {
    let mut problems = Vec::new();
    let mut entries = if path.is_dir() {
        load_directory(path, &mut problems)
    } else {
        match load_document(path) {
            Ok(entries) => entries,
            Err(error) => {
                problems.push(error);
                Vec::new()
            }
        }
    };

    if entries.len() > MAX_MANIFEST_ENTRIES {
        entries.truncate(MAX_MANIFEST_ENTRIES);
        problems.push(DocsError::LimitExceeded {
            what: "manifest entries",
            limit: MAX_MANIFEST_ENTRIES,
        });
    }

    (entries.into_iter().map(ComponentManifestEntry::normalized).collect(), problems)
}

fn load_document(path: &Path) -> Result<Vec<ComponentManifestEntry>, DocsError> {
    let text = fs::read_to_string(path).map_err(|e| DocsError::manifest_unavailable(path, e))?;
    let document: ManifestDocument =
        serde_json::from_str(&text).map_err(|e| DocsError::manifest_malformed(path, e))?;
    Ok(document.components)
}

fn load_directory(path: &Path, problems: &mut Vec<DocsError>) -> Vec<ComponentManifestEntry> {
    let files: Vec<_> = WalkDir::new(path)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
        .collect();

    if files.len() > MAX_MANIFEST_FILES {
        problems.push(DocsError::LimitExceeded {
            what: "manifest files",
            limit: MAX_MANIFEST_FILES,
        });
    }

    let mut entries = Vec::new();
    for file in files.iter().take(MAX_MANIFEST_FILES) {
        let parsed = fs::read_to_string(file.path())
            .map_err(|e| DocsError::manifest_unavailable(file.path(), e))
            .and_then(|text| {
                serde_json::from_str::<ComponentManifestEntry>(&text)
                    .map_err(|e| DocsError::manifest_malformed(file.path(), e))
            });
        match parsed {
            Ok(entry) => entries.push(entry),
            Err(error) => problems.push(error),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Button"), "button");
        assert_eq!(slugify("IconButton"), "icon-button");
        assert_eq!(slugify("Date Picker"), "date-picker");
        assert_eq!(slugify("  Tabs / Panel "), "tabs-panel");
        assert_eq!(slugify("DataGridV2"), "data-grid-v2");
    }

    #[test]
    fn test_single_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"components": [
                {"name": "IconButton", "props": [
                    {"name": "size", "type": "'sm' | 'md'", "default": "md", "required": false},
                    {"name": "label", "type": "string", "required": true}
                ]},
                {"name": "Input", "slug": "text-input"}
            ]}"#,
        )
        .unwrap();

        let (entries, problems) = load_manifest(&path);
        assert!(problems.is_empty());
        assert_eq!(entries[0].slug, "icon-button");
        assert_eq!(entries[0].props[0].default_label().as_deref(), Some("md"));
        assert_eq!(entries[0].required_props().count(), 1);
        assert_eq!(entries[1].slug, "text-input");
    }

    #[test]
    fn test_directory_skips_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a-button.json"), r#"{"name": "Button"}"#).unwrap();
        fs::write(dir.path().join("b-broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (entries, problems) = load_manifest(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "button");
        assert_eq!(problems.len(), 1);
        assert!(matches!(problems[0], DocsError::ManifestMalformed { .. }));
    }

    #[test]
    fn test_missing_manifest_is_soft() {
        let dir = tempdir().unwrap();
        let (entries, problems) = load_manifest(&dir.path().join("missing.json"));
        assert!(entries.is_empty());
        assert!(matches!(problems[0], DocsError::ManifestUnavailable { .. }));
    }
}
