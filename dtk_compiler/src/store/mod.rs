//! Token Store: loads raw token documents per layer
//!
//! Each layer (primitive, semantic, component) has at most one registered
//! `DocumentSource`. Loading parses the document into a `TokenNode` tree with
//! every `$value` already split into a literal or a reference expression.

pub mod error;
pub mod parser;
pub mod source;
pub mod types;

pub use error::StoreError;
pub use source::{DocumentSource, FileDocument, InlineDocument};
pub use types::{RawValue, TokenLayer, TokenLeaf, TokenNode, TokenPath, TokenValue};

use crate::config::compile_time::documents::{
    LARGE_DOCUMENT_THRESHOLD, MAX_DOCUMENT_SIZE, MAX_TOKENS_PER_LAYER, MAX_TREE_DEPTH,
};
use crate::config::runtime::StorePreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_performance, log_success};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

static NEXT_DOCUMENT_ID: AtomicUsize = AtomicUsize::new(1);

/// Registry of layer sources
pub struct TokenStore {
    sources: BTreeMap<TokenLayer, Box<dyn DocumentSource>>,
    preferences: StorePreferences,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::with_preferences(StorePreferences::default())
    }

    pub fn with_preferences(preferences: StorePreferences) -> Self {
        Self {
            sources: BTreeMap::new(),
            preferences,
        }
    }

    /// Builder form of `register`
    pub fn with_source(mut self, layer: TokenLayer, source: impl DocumentSource + 'static) -> Self {
        self.register(layer, Box::new(source));
        self
    }

    /// Register (or replace) the source for a layer
    pub fn register(&mut self, layer: TokenLayer, source: Box<dyn DocumentSource>) {
        log_debug!("Registered layer source",
            "layer" => layer,
            "document" => source.identifier());
        self.sources.insert(layer, source);
    }

    pub fn has_source(&self, layer: TokenLayer) -> bool {
        self.sources.contains_key(&layer)
    }

    pub fn source_identifier(&self, layer: TokenLayer) -> Option<String> {
        self.sources.get(&layer).map(|source| source.identifier())
    }

    pub fn preferences(&self) -> &StorePreferences {
        &self.preferences
    }

    /// The fixed layer order; later layers may reference earlier ones
    pub fn list_layers() -> &'static [TokenLayer] {
        &TokenLayer::ALL
    }

    /// Read and parse the document registered for `layer`
    pub fn load(&self, layer: TokenLayer) -> Result<TokenNode, StoreError> {
        let Some(source) = self.sources.get(&layer) else {
            let error = StoreError::source_unavailable(layer.as_str(), "no source registered for layer");
            log_error!(error.error_code(), "No source registered for layer", "layer" => layer);
            return Err(error);
        };
        self.load_document(source.as_ref())
    }

    /// Read and parse any document (layer or override) with this store's preferences
    pub fn load_document(&self, source: &dyn DocumentSource) -> Result<TokenNode, StoreError> {
        let document = source.identifier();
        let document_id = NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed);

        crate::logging::with_source_context(document.clone(), document_id, || -> Result<TokenNode, StoreError> {
            let start = Instant::now();
            let text = source.read()?;
            let tree = parser::parse_document(&text, &document, self.preferences.retain_metadata)?;

            if self.preferences.enable_performance_logging {
                log_performance!(codes::success::DOCUMENT_LOADED, "Token document loaded",
                    duration = start.elapsed(),
                    "document" => &document,
                    "bytes" => text.len(),
                    "tokens" => tree.leaf_count());
            } else {
                log_success!(codes::success::DOCUMENT_LOADED, "Token document loaded",
                    "document" => &document,
                    "tokens" => tree.leaf_count());
            }

            Ok(tree)
        })
    }

    /// Load every registered layer in order. The primitive layer is required;
    /// semantic and component layers are optional.
    pub fn load_all(&self) -> Result<Vec<(TokenLayer, TokenNode)>, StoreError> {
        let mut layers = Vec::with_capacity(TokenLayer::ALL.len());
        for &layer in Self::list_layers() {
            if layer != TokenLayer::Primitive && !self.has_source(layer) {
                log_debug!("Skipping unregistered optional layer", "layer" => layer);
                continue;
            }
            layers.push((layer, self.load(layer)?));
        }
        Ok(layers)
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Startup check that store codes are registered
pub fn init_store_logging() -> Result<(), String> {
    let store_codes = [
        codes::store::SOURCE_UNAVAILABLE,
        codes::store::DOCUMENT_TOO_LARGE,
        codes::store::MALFORMED_DOCUMENT,
        codes::store::MIXED_NODE,
        codes::store::INVALID_LEAF_VALUE,
        codes::store::TREE_TOO_DEEP,
        codes::store::TOO_MANY_TOKENS,
        codes::store::INVALID_KEY,
    ];

    for code in &store_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Token store error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Token store compile-time configuration loaded",
        "max_document_size" => MAX_DOCUMENT_SIZE,
        "large_document_threshold" => LARGE_DOCUMENT_THRESHOLD,
        "max_tree_depth" => MAX_TREE_DEPTH,
        "max_tokens_per_layer" => MAX_TOKENS_PER_LAYER);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const PRIMITIVE: &str = r##"{"color": {"blue": {"500": {"$value": "#3b82f6"}}}}"##;

    #[test]
    fn test_list_layers_is_fixed() {
        assert_eq!(
            TokenStore::list_layers(),
            &[TokenLayer::Primitive, TokenLayer::Semantic, TokenLayer::Component]
        );
    }

    #[test]
    fn test_load_inline_layer() {
        let store = TokenStore::new()
            .with_source(TokenLayer::Primitive, InlineDocument::new("primitive", PRIMITIVE));

        let tree = store.load(TokenLayer::Primitive).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(store.source_identifier(TokenLayer::Primitive).as_deref(), Some("primitive"));
        assert_eq!(store.source_identifier(TokenLayer::Semantic), None);
    }

    #[test]
    fn test_load_file_layer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("primitive.json");
        fs::write(&path, PRIMITIVE).unwrap();

        let store = TokenStore::new().with_source(TokenLayer::Primitive, FileDocument::new(&path));
        assert!(store.load(TokenLayer::Primitive).is_ok());
    }

    #[test]
    fn test_non_utf8_file_layer_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("primitive.json");
        fs::write(&path, b"{\"color\": {\"a\": {\"$value\": \"\xff\xfe\"}}}").unwrap();

        let store = TokenStore::new().with_source(TokenLayer::Primitive, FileDocument::new(&path));
        assert_matches!(
            store.load(TokenLayer::Primitive),
            Err(StoreError::MalformedDocument { document, .. }) if document.ends_with("primitive.json")
        );
    }

    #[test]
    fn test_unregistered_layer_is_unavailable() {
        let store = TokenStore::new();
        assert_matches!(
            store.load(TokenLayer::Semantic),
            Err(StoreError::SourceUnavailable { document, .. }) if document == "semantic"
        );
    }

    #[test]
    fn test_load_all_requires_primitive_only() {
        let store = TokenStore::new()
            .with_source(TokenLayer::Primitive, InlineDocument::new("primitive", PRIMITIVE))
            .with_source(TokenLayer::Component, InlineDocument::new("component", "{}"));

        let layers = store.load_all().unwrap();
        let names: Vec<TokenLayer> = layers.iter().map(|(layer, _)| *layer).collect();
        assert_eq!(names, vec![TokenLayer::Primitive, TokenLayer::Component]);

        assert_matches!(
            TokenStore::new().load_all(),
            Err(StoreError::SourceUnavailable { .. })
        );
    }

    #[test]
    fn test_malformed_layer_names_document() {
        let store = TokenStore::new()
            .with_source(TokenLayer::Semantic, InlineDocument::new("semantic.json", "not json"));

        assert_matches!(
            store.load(TokenLayer::Semantic),
            Err(StoreError::MalformedDocument { document, .. }) if document == "semantic.json"
        );
    }

    #[test]
    fn test_init_store_logging() {
        assert!(init_store_logging().is_ok());
    }
}
