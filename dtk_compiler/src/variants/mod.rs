//! Variant Expander
//!
//! Produces one resolved set per (theme, density) pair. Override documents are
//! applied leaf by leaf on top of a copy of the base set: overriding
//! `color.text.primary` never drops `color.text.secondary`. A variant with no
//! override document is the base set unchanged.

pub mod types;

pub use types::{DensityLevel, OverrideTarget, ParseVariantError, ThemeMode, Variant, VariantOverrides};

use crate::config::compile_time::variants::MAX_OVERRIDE_DOCUMENTS;
use crate::config::runtime::ResolutionPreferences;
use crate::logging::codes;
use crate::references::{ReferenceError, ResolutionStats, ResolvedTokenSet, Resolver};
use crate::store::types::TokenNode;
use crate::{log_debug, log_error, log_success, log_warning};
use serde::Serialize;
use std::collections::BTreeMap;

/// Expand with one optional document per exact variant
pub fn expand(
    base: &ResolvedTokenSet,
    overrides: &BTreeMap<Variant, TokenNode>,
) -> Result<BTreeMap<Variant, ResolvedTokenSet>, ReferenceError> {
    let overrides = VariantOverrides::from_pairs(overrides.clone());
    Expander::new().expand_layered(base, &overrides)
}

/// Expand with theme-, density- and pair-level documents
pub fn expand_layered(
    base: &ResolvedTokenSet,
    overrides: &VariantOverrides,
) -> Result<BTreeMap<Variant, ResolvedTokenSet>, ReferenceError> {
    Expander::new().expand_layered(base, overrides)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionStats {
    pub variants: usize,
    pub overridden_variants: usize,
    pub override_leaves_applied: usize,
    pub new_paths: usize,
}

pub struct Expander {
    preferences: ResolutionPreferences,
    stats: ExpansionStats,
    resolution: ResolutionStats,
}

impl Expander {
    pub fn new() -> Self {
        Self::with_preferences(ResolutionPreferences::default())
    }

    pub fn with_preferences(preferences: ResolutionPreferences) -> Self {
        Self {
            preferences,
            stats: ExpansionStats::default(),
            resolution: ResolutionStats::default(),
        }
    }

    pub fn stats(&self) -> &ExpansionStats {
        &self.stats
    }

    /// Resolution counters for the override documents
    pub fn resolution_stats(&self) -> &ResolutionStats {
        &self.resolution
    }

    /// All nine variants
    pub fn expand_layered(
        &mut self,
        base: &ResolvedTokenSet,
        overrides: &VariantOverrides,
    ) -> Result<BTreeMap<Variant, ResolvedTokenSet>, ReferenceError> {
        if overrides.len() > MAX_OVERRIDE_DOCUMENTS {
            log_warning!("Override document count exceeds configured maximum",
                "documents" => overrides.len(),
                "max" => MAX_OVERRIDE_DOCUMENTS);
        }

        let mut expanded = BTreeMap::new();
        for variant in Variant::all() {
            let set = self.expand_variant(base, overrides, variant)?;
            expanded.insert(variant, set);
        }

        log_success!(codes::success::EXPANSION_COMPLETE, "Variants expanded",
            "variants" => expanded.len(),
            "overridden" => self.stats.overridden_variants,
            "override_leaves" => self.stats.override_leaves_applied);

        Ok(expanded)
    }

    /// One variant: theme document, then density, then the exact pair, each
    /// resolved against the result of the previous step
    pub fn expand_variant(
        &mut self,
        base: &ResolvedTokenSet,
        overrides: &VariantOverrides,
        variant: Variant,
    ) -> Result<ResolvedTokenSet, ReferenceError> {
        self.stats.variants += 1;

        let documents = overrides.documents_for(variant);
        if documents.is_empty() {
            log_debug!("Variant passes base set through", "variant" => variant);
            return Ok(base.clone());
        }
        self.stats.overridden_variants += 1;

        let mut current = base.clone();
        for (target, node) in documents {
            let label = target.to_string();
            self.note_new_paths(node, base, &label, variant);

            let mut resolver = Resolver::with_preferences(self.preferences.clone());
            current = resolver
                .resolve_against(node, &label, &current)
                .inspect_err(|error| {
                    log_error!(codes::variants::OVERRIDE_RESOLUTION_FAILED,
                        "Override document failed to resolve",
                        "variant" => variant,
                        "override" => &label,
                        "error" => error);
                })?;

            self.stats.override_leaves_applied += node.leaf_count();
            self.resolution.merge(resolver.into_stats());
        }

        Ok(current)
    }

    fn note_new_paths(&mut self, node: &TokenNode, base: &ResolvedTokenSet, label: &str, variant: Variant) {
        for (path, _) in node.leaves() {
            if base.contains_path(&path) {
                continue;
            }
            self.stats.new_paths += 1;
            if self.preferences.warn_on_new_override_paths {
                log_warning!(code = codes::variants::NEW_OVERRIDE_PATH,
                    "Override introduces a token the base set does not define",
                    "variant" => variant,
                    "override" => label,
                    "path" => path);
            }
        }
    }
}

impl Default for Expander {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::resolve;
    use crate::store::parser::parse_document;
    use crate::store::types::{TokenLayer, TokenValue};
    use assert_matches::assert_matches;

    fn doc(json: &str) -> TokenNode {
        parse_document(json, "override", true).unwrap()
    }

    fn base() -> ResolvedTokenSet {
        let primitive = doc(
            r##"{
                "color": { "blue": { "500": { "$value": "#3b82f6" } }, "white": { "$value": "#ffffff" }, "black": { "$value": "#000000" } },
                "space": { "md": { "$value": "8px" } }
            }"##,
        );
        let semantic = doc(
            r#"{"color": {"text": {
                "primary": { "$value": "{color.black}" },
                "secondary": { "$value": "{color.blue.500}" }
            }}}"#,
        );
        resolve(&[(TokenLayer::Primitive, primitive), (TokenLayer::Semantic, semantic)]).unwrap()
    }

    fn text(value: &str) -> TokenValue {
        TokenValue::text(value)
    }

    #[test]
    fn test_no_overrides_passes_base_through() {
        let base = base();
        let expanded = expand(&base, &BTreeMap::new()).unwrap();

        assert_eq!(expanded.len(), 9);
        assert!(expanded.values().all(|set| *set == base));
    }

    #[test]
    fn test_override_is_leaf_granular() {
        let base = base();
        let dark = Variant::new(ThemeMode::Dark, DensityLevel::Default);
        let mut overrides = BTreeMap::new();
        overrides.insert(
            dark,
            doc(r#"{"color": {"text": {"primary": {"$value": "{color.white}"}}}}"#),
        );

        let expanded = expand(&base, &overrides).unwrap();
        let dark_set = &expanded[&dark];

        assert_eq!(dark_set.value("color-text-primary"), Some(&text("#ffffff")));
        assert_eq!(dark_set.value("color-text-secondary"), Some(&text("#3b82f6")));
        assert_eq!(dark_set.len(), base.len());
        assert_eq!(expanded[&Variant::DEFAULT], base);
    }

    #[test]
    fn test_override_references_its_own_document() {
        let base = base();
        let dark = Variant::new(ThemeMode::Dark, DensityLevel::Compact);
        let mut overrides = BTreeMap::new();
        overrides.insert(
            dark,
            doc(r##"{
                "color": {
                    "surface": { "$value": "#111827" },
                    "text": { "primary": { "$value": "{color.surface}" } }
                }
            }"##),
        );

        let mut expander = Expander::new();
        let expanded = expander
            .expand_layered(&base, &VariantOverrides::from_pairs(overrides))
            .unwrap();
        assert_eq!(expanded[&dark].value("color-text-primary"), Some(&text("#111827")));
        assert_eq!(expander.stats().new_paths, 1);
        assert_eq!(expander.stats().overridden_variants, 1);
    }

    #[test]
    fn test_new_override_path_is_warned() {
        let base = base();
        let mut overrides = VariantOverrides::new();
        overrides.insert(
            OverrideTarget::Theme(ThemeMode::Dark),
            doc(r##"{"color": {"focus": {"$value": "#facc15"}}}"##),
        );

        let mut expander = Expander::with_preferences(ResolutionPreferences {
            warn_on_new_override_paths: true,
            ..ResolutionPreferences::default()
        });
        let (result, logger) = crate::logging::capture_events(|| expander.expand_layered(&base, &overrides));

        assert!(result.is_ok());
        assert!(logger.has_warning_with_code(codes::variants::NEW_OVERRIDE_PATH));
        // one dark theme document, applied to each of the three densities
        assert_eq!(logger.with_code(codes::variants::NEW_OVERRIDE_PATH).len(), 3);
        assert_eq!(expander.stats().new_paths, 3);

        let mut quiet = Expander::with_preferences(ResolutionPreferences {
            warn_on_new_override_paths: false,
            ..ResolutionPreferences::default()
        });
        let (_, logger) = crate::logging::capture_events(|| quiet.expand_layered(&base, &overrides));
        assert!(!logger.has_warning_with_code(codes::variants::NEW_OVERRIDE_PATH));
        assert_eq!(quiet.stats().new_paths, 3);
    }

    #[test]
    fn test_layered_application_order() {
        let base = base();
        let mut overrides = VariantOverrides::new();
        overrides.insert(
            OverrideTarget::Theme(ThemeMode::Dark),
            doc(r##"{"color": {"text": {"primary": {"$value": "#eeeeee"}}}, "space": {"md": {"$value": "9px"}}}"##),
        );
        overrides.insert(
            OverrideTarget::Density(DensityLevel::Compact),
            doc(r#"{"space": {"md": {"$value": "6px"}}}"#),
        );
        let dark_compact = Variant::new(ThemeMode::Dark, DensityLevel::Compact);
        overrides.insert(
            OverrideTarget::Pair(dark_compact),
            doc(r#"{"color": {"text": {"secondary": {"$value": "{color.text.primary}"}}}}"#),
        );

        let expanded = expand_layered(&base, &overrides).unwrap();

        let set = &expanded[&dark_compact];
        assert_eq!(set.value("space-md"), Some(&text("6px")));
        assert_eq!(set.value("color-text-secondary"), Some(&text("#eeeeee")));

        let dark_default = &expanded[&Variant::new(ThemeMode::Dark, DensityLevel::Default)];
        assert_eq!(dark_default.value("space-md"), Some(&text("9px")));

        let light_compact = &expanded[&Variant::new(ThemeMode::Light, DensityLevel::Compact)];
        assert_eq!(light_compact.value("space-md"), Some(&text("6px")));
        assert_eq!(light_compact.value("color-text-primary"), Some(&text("#000000")));
    }

    #[test]
    fn test_unresolved_override_reference_fails() {
        let base = base();
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Variant::new(ThemeMode::HighContrast, DensityLevel::Default),
            doc(r#"{"color": {"text": {"primary": {"$value": "{color.yellow}"}}}}"#),
        );

        assert_matches!(
            expand(&base, &overrides),
            Err(ReferenceError::UnresolvedReference { layer, .. }) if layer == "variant:high-contrast/default"
        );
    }
}
