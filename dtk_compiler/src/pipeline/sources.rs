//! Everything a build reads, gathered before any document is opened

use super::error::PipelineError;
use super::output::PipelineOutput;
use crate::config::runtime::{EmitterPreferences, ResolutionPreferences};
use crate::config::ProjectConfig;
use crate::store::{DocumentSource, FileDocument, StoreError, TokenLayer, TokenStore};
use crate::variants::{OverrideTarget, VariantOverrides};
use crate::{log_debug, log_warning};

/// Layer sources, override sources and the preferences to build them with
pub struct ThemeSources {
    pub store: TokenStore,
    pub overrides: Vec<(OverrideTarget, Box<dyn DocumentSource>)>,
    pub emitter: EmitterPreferences,
    pub resolution: ResolutionPreferences,
}

impl ThemeSources {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            overrides: Vec::new(),
            emitter: EmitterPreferences::default(),
            resolution: ResolutionPreferences::default(),
        }
    }

    /// File sources for every configured layer and override document
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut store = TokenStore::new();
        for &layer in TokenStore::list_layers() {
            if let Some(path) = config.layer_source(layer) {
                store.register(layer, Box::new(FileDocument::new(path)));
            }
        }

        let mut sources = Self::new(store);
        sources.emitter = config.emitter_preferences();
        for (target, path) in config.override_sources() {
            sources = sources.with_override(target, FileDocument::new(path));
        }

        log_debug!("Build sources gathered from project configuration",
            "project" => &config.name,
            "layers" => TokenLayer::ALL.iter().filter(|l| sources.store.has_source(**l)).count(),
            "overrides" => sources.overrides.len());

        sources
    }

    pub fn with_override(mut self, target: OverrideTarget, source: impl DocumentSource + 'static) -> Self {
        self.overrides.push((target, Box::new(source)));
        self
    }

    /// Read and parse every override document
    pub fn load_overrides(&self) -> Result<VariantOverrides, StoreError> {
        let mut overrides = VariantOverrides::new();
        for (target, source) in &self.overrides {
            let node = self.store.load_document(source.as_ref())?;
            if overrides.insert(*target, node).is_some() {
                log_warning!("Override document replaces an earlier one for the same target",
                    "target" => target,
                    "document" => source.identifier());
            }
        }
        Ok(overrides)
    }

    pub fn build(&self) -> Result<PipelineOutput, PipelineError> {
        let overrides = self.load_overrides()?;
        super::run(&self.store, &overrides, &self.emitter, &self.resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InlineDocument;
    use crate::variants::ThemeMode;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_config_registers_configured_layers() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("primitive.json"), r#"{"space": {"md": {"$value": "8px"}}}"#).unwrap();
        fs::write(dir.path().join("dark.json"), r#"{"space": {"md": {"$value": "9px"}}}"#).unwrap();
        fs::write(
            dir.path().join("tokens.toml"),
            "[layers]\nprimitive = \"primitive.json\"\n\n[[overrides]]\ntheme = \"dark\"\nsource = \"dark.json\"\n",
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path().join("tokens.toml")).unwrap();
        let sources = ThemeSources::from_config(&config);

        assert!(sources.store.has_source(TokenLayer::Primitive));
        assert!(!sources.store.has_source(TokenLayer::Semantic));
        assert_eq!(sources.overrides.len(), 1);

        let overrides = sources.load_overrides().unwrap();
        assert_eq!(overrides.themes.len(), 1);
        assert!(overrides.themes.contains_key(&ThemeMode::Dark));
    }

    #[test]
    fn test_override_load_failure_propagates() {
        let store = TokenStore::new()
            .with_source(TokenLayer::Primitive, InlineDocument::new("primitive", "{}"));
        let sources = ThemeSources::new(store)
            .with_override(OverrideTarget::Theme(ThemeMode::Dark), InlineDocument::new("dark", "{"));

        assert!(sources.load_overrides().is_err());
        assert!(matches!(sources.build(), Err(PipelineError::Store(_))));
    }
}
