//! Where the bridge reads its documents from

use dtk_compiler::ProjectConfig;
use std::path::PathBuf;

pub const DEFAULT_COLOR_GROUP: &str = "color";

#[derive(Debug, Clone, PartialEq)]
pub struct DocsConfig {
    /// A `{"components": [...]}` document or a directory of per-component files
    pub manifest: Option<PathBuf>,

    /// Usage examples document
    pub examples: Option<PathBuf>,

    /// Primitive group flattened into swatches
    pub color_group: String,

    /// Custom property prefix shown next to each swatch
    pub custom_property_prefix: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            examples: None,
            color_group: DEFAULT_COLOR_GROUP.to_string(),
            custom_property_prefix: String::new(),
        }
    }
}

impl DocsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths resolved against the project directory
    pub fn from_project(project: &ProjectConfig) -> Self {
        Self {
            manifest: project.manifest_path(),
            examples: project.examples_path(),
            color_group: project.color_group().to_string(),
            custom_property_prefix: project.emitter_preferences().custom_property_prefix,
        }
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    pub fn with_examples(mut self, path: impl Into<PathBuf>) -> Self {
        self.examples = Some(path.into());
        self
    }

    pub fn with_color_group(mut self, group: impl Into<String>) -> Self {
        self.color_group = group.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_property_prefix = prefix.into();
        self
    }
}
