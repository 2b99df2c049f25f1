//! Project configuration (`tokens.toml`)
//!
//! Names the layer documents, the variant override documents, emitter options,
//! documentation sources and the output directory. Relative paths resolve
//! against the directory containing the configuration file.
//!
//! ```toml
//! name = "acme"
//!
//! [layers]
//! primitive = "tokens/primitive.json"
//! semantic = "tokens/semantic.json"
//!
//! [[overrides]]
//! theme = "dark"
//! source = "tokens/overrides/dark.json"
//!
//! [emitter]
//! prefix = "acme"
//! ```

use super::compile_time::variants::MAX_OVERRIDE_DOCUMENTS;
use super::runtime::EmitterPreferences;
use crate::logging::{codes, Code};
use crate::store::types::TokenLayer;
use crate::variants::{DensityLevel, OverrideTarget, ThemeMode, Variant};
use crate::{log_debug, log_error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "tokens.toml";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Cannot read project configuration '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid TOML in '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Invalid project configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            ConfigError::Unreadable { .. } => codes::config::CONFIG_UNREADABLE,
            ConfigError::Parse { .. } => codes::config::CONFIG_MALFORMED,
            ConfigError::Invalid { .. } => codes::config::CONFIG_INVALID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSources {
    pub primitive: PathBuf,
    pub semantic: Option<PathBuf>,
    pub component: Option<PathBuf>,
}

/// One override document and the variants it applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideSource {
    pub theme: Option<ThemeMode>,
    pub density: Option<DensityLevel>,
    pub source: PathBuf,
}

impl OverrideSource {
    pub fn target(&self) -> Option<OverrideTarget> {
        match (self.theme, self.density) {
            (Some(theme), Some(density)) => Some(OverrideTarget::Pair(Variant::new(theme, density))),
            (Some(theme), None) => Some(OverrideTarget::Theme(theme)),
            (None, Some(density)) => Some(OverrideTarget::Density(density)),
            (None, None) => None,
        }
    }
}

/// Emitter options; unset fields fall back to the runtime preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitterOptions {
    pub prefix: Option<String>,
    pub theme_attribute: Option<String>,
    pub density_attribute: Option<String>,
    pub header_comment: Option<bool>,
}

/// Documentation inputs for the manifest bridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocsSources {
    /// A `{"components": [...]}` document or a directory of per-component files
    pub manifest: Option<PathBuf>,
    pub examples: Option<PathBuf>,
    /// Primitive group listed as color swatches
    pub color_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputOptions {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("dist")
}

fn default_name() -> String {
    "design-tokens".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub layers: LayerSources,
    #[serde(default)]
    pub overrides: Vec<OverrideSource>,
    #[serde(default)]
    pub emitter: EmitterOptions,
    #[serde(default)]
    pub docs: DocsSources,
    #[serde(default)]
    pub output: OutputOptions,

    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ProjectConfig {
    /// Read, parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let text = fs::read_to_string(path).map_err(|e| {
            let error = ConfigError::Unreadable {
                path: origin.clone(),
                reason: e.to_string(),
            };
            log_error!(error.error_code(), "Project configuration unreadable",
                "path" => &origin,
                "io_error" => e);
            error
        })?;

        let mut config = Self::from_toml_str(&text, &origin)?;
        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        log_debug!("Project configuration loaded",
            "path" => &origin,
            "name" => &config.name,
            "overrides" => config.overrides.len());

        Ok(config)
    }

    /// Parse and validate configuration text; `origin` names it in errors
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: ProjectConfig = toml::from_str(text).map_err(|e| {
            let error = ConfigError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            };
            log_error!(error.error_code(), "Project configuration is not valid TOML",
                "path" => origin);
            error
        })?;

        config.validate().inspect_err(|error| {
            log_error!(error.error_code(), &error.to_string(), "path" => origin);
        })?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overrides.len() > MAX_OVERRIDE_DOCUMENTS {
            return Err(ConfigError::invalid(format!(
                "{} override documents configured, limit is {}",
                self.overrides.len(),
                MAX_OVERRIDE_DOCUMENTS
            )));
        }

        let mut targets = BTreeSet::new();
        for entry in &self.overrides {
            let Some(target) = entry.target() else {
                return Err(ConfigError::invalid(format!(
                    "override '{}' names neither a theme nor a density",
                    entry.source.display()
                )));
            };
            if !targets.insert(target) {
                return Err(ConfigError::invalid(format!(
                    "more than one override document for {}",
                    target
                )));
            }
        }

        crate::emit::validate_preferences(&self.emitter_preferences())
            .map_err(|e| ConfigError::invalid(e.to_string()))
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn layer_source(&self, layer: TokenLayer) -> Option<PathBuf> {
        let path = match layer {
            TokenLayer::Primitive => Some(&self.layers.primitive),
            TokenLayer::Semantic => self.layers.semantic.as_ref(),
            TokenLayer::Component => self.layers.component.as_ref(),
        };
        path.map(|p| self.resolve_path(p))
    }

    /// Override documents with resolved paths; entries without a target are skipped
    pub fn override_sources(&self) -> Vec<(OverrideTarget, PathBuf)> {
        self.overrides
            .iter()
            .filter_map(|entry| Some((entry.target()?, self.resolve_path(&entry.source))))
            .collect()
    }

    pub fn emitter_preferences(&self) -> EmitterPreferences {
        let mut preferences = EmitterPreferences::default();
        if let Some(prefix) = &self.emitter.prefix {
            preferences.custom_property_prefix = prefix.clone();
        }
        if let Some(attribute) = &self.emitter.theme_attribute {
            preferences.theme_attribute = attribute.clone();
        }
        if let Some(attribute) = &self.emitter.density_attribute {
            preferences.density_attribute = attribute.clone();
        }
        if let Some(header) = self.emitter.header_comment {
            preferences.include_header_comment = header;
        }
        preferences
    }

    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.docs.manifest.as_ref().map(|p| self.resolve_path(p))
    }

    pub fn examples_path(&self) -> Option<PathBuf> {
        self.docs.examples.as_ref().map(|p| self.resolve_path(p))
    }

    pub fn color_group(&self) -> &str {
        self.docs.color_group.as_deref().unwrap_or("color")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.output.directory)
    }
}
