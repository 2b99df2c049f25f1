//! Reference Resolver
//!
//! Layers are resolved in cascade order. Within a layer every leaf is visited
//! in sorted path order; a reference is looked up first in the same layer
//! (resolving that entry on demand) and then in the already-resolved lower
//! layers. Later layers replace earlier ones path by path.
//!
//! Substitution keeps the chain of paths currently being resolved, so a
//! revisit is reported as a cycle with the full chain and pathological chains
//! stop at `MAX_REFERENCE_DEPTH` instead of exhausting the stack.

pub mod error;
pub mod syntax;
pub mod types;

pub use error::ReferenceError;
pub use syntax::{Segment, SyntaxError, ValueExpr};
pub use types::{LayerStats, ResolutionStats, ResolvedToken, ResolvedTokenSet};

use crate::config::compile_time::references::{MAX_REFERENCE_DEPTH, MAX_REPORTED_CHAIN_LENGTH};
use crate::config::runtime::ResolutionPreferences;
use crate::logging::codes;
use crate::store::types::{RawValue, TokenLayer, TokenLeaf, TokenNode, TokenPath, TokenValue};
use crate::{log_debug, log_error, log_info, log_success};
use std::collections::BTreeMap;

/// Resolve layers in cascade order with default preferences
pub fn resolve(layers: &[(TokenLayer, TokenNode)]) -> Result<ResolvedTokenSet, ReferenceError> {
    Resolver::new().resolve(layers)
}

/// Resolve one document on top of an already-resolved set
pub fn resolve_against(
    node: &TokenNode,
    label: &str,
    lower: &ResolvedTokenSet,
) -> Result<ResolvedTokenSet, ReferenceError> {
    Resolver::new().resolve_against(node, label, lower)
}

pub struct Resolver {
    preferences: ResolutionPreferences,
    stats: ResolutionStats,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_preferences(ResolutionPreferences::default())
    }

    pub fn with_preferences(preferences: ResolutionPreferences) -> Self {
        Self {
            preferences,
            stats: ResolutionStats::default(),
        }
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    pub fn into_stats(self) -> ResolutionStats {
        self.stats
    }

    /// Resolve every layer; input order is normalized to the cascade order
    pub fn resolve(
        &mut self,
        layers: &[(TokenLayer, TokenNode)],
    ) -> Result<ResolvedTokenSet, ReferenceError> {
        let mut ordered: Vec<&(TokenLayer, TokenNode)> = layers.iter().collect();
        ordered.sort_by_key(|(layer, _)| *layer);

        let mut resolved = ResolvedTokenSet::new();
        for (layer, node) in ordered {
            resolved = self.resolve_against(node, layer.as_str(), &resolved)?;
        }

        log_success!(codes::success::RESOLUTION_COMPLETE, "Token layers resolved",
            "layers" => layers.len(),
            "tokens" => resolved.len(),
            "references" => self.stats.references_resolved);

        Ok(resolved)
    }

    /// Resolve `node` (labelled `label` in diagnostics) against `lower`,
    /// returning `lower` with this document's leaves applied
    pub fn resolve_against(
        &mut self,
        node: &TokenNode,
        label: &str,
        lower: &ResolvedTokenSet,
    ) -> Result<ResolvedTokenSet, ReferenceError> {
        let mut layer = LayerResolver {
            label,
            entries: node.leaves().into_iter().collect(),
            lower,
            resolved: BTreeMap::new(),
            chain: Vec::new(),
            references: 0,
            log_details: self.preferences.log_resolution_details,
        };

        let paths: Vec<TokenPath> = layer.entries.keys().cloned().collect();
        for path in &paths {
            if let Err(error) = layer.resolve_path(path) {
                report(&error, label, path);
                return Err(error);
            }
        }

        let mut merged = lower.clone();
        let mut overrides = 0;
        for (path, value) in layer.resolved {
            let token_type = layer
                .entries
                .get(&path)
                .and_then(|leaf| leaf.token_type.clone());
            let location = path.to_string();
            let replaced = merged
                .insert(ResolvedToken {
                    path,
                    value,
                    token_type,
                })
                .inspect_err(|error| report(error, label, &location))?;

            if let Some(previous) = replaced {
                overrides += 1;
                if self.preferences.report_cascade_overrides {
                    log_info!("Cascade override",
                        "layer" => label,
                        "path" => &location,
                        "previous" => previous);
                }
            }
        }

        self.stats.layers.push(LayerStats {
            label: label.to_string(),
            tokens: layer.entries.len(),
            references: layer.references,
        });
        self.stats.references_resolved += layer.references;
        self.stats.cascade_overrides += overrides;

        log_debug!("Layer resolved",
            "layer" => label,
            "tokens" => layer.entries.len(),
            "references" => layer.references,
            "overrides" => overrides);

        Ok(merged)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

struct LayerResolver<'a> {
    label: &'a str,
    entries: BTreeMap<TokenPath, &'a TokenLeaf>,
    lower: &'a ResolvedTokenSet,
    resolved: BTreeMap<TokenPath, TokenValue>,
    chain: Vec<TokenPath>,
    references: usize,
    log_details: bool,
}

impl LayerResolver<'_> {
    fn resolve_path(&mut self, path: &TokenPath) -> Result<TokenValue, ReferenceError> {
        if let Some(value) = self.resolved.get(path) {
            return Ok(value.clone());
        }

        if let Some(position) = self.chain.iter().position(|p| p == path) {
            let mut cycle: Vec<String> = self.chain[position..].iter().map(TokenPath::to_string).collect();
            cycle.push(path.to_string());
            return Err(ReferenceError::CyclicReference {
                cycle,
                layer: self.label.to_string(),
            });
        }

        let Some(leaf) = self.entries.get(path).copied() else {
            return Err(ReferenceError::UnresolvedReference {
                reference: path.to_string(),
                referenced_from: path.to_string(),
                layer: self.label.to_string(),
                chain: vec![path.to_string()],
            });
        };

        let value = match &leaf.value {
            RawValue::Literal(value) => value.clone(),
            RawValue::Expression(expr) => {
                if self.chain.len() >= MAX_REFERENCE_DEPTH {
                    return Err(ReferenceError::DepthExceeded {
                        path: self.chain[0].to_string(),
                        depth: self.chain.len(),
                        max_depth: MAX_REFERENCE_DEPTH,
                    });
                }

                self.chain.push(path.clone());
                let result = self.evaluate(expr, path);
                self.chain.pop();
                result?
            }
        };

        self.resolved.insert(path.clone(), value.clone());
        Ok(value)
    }

    fn evaluate(&mut self, expr: &ValueExpr, from: &TokenPath) -> Result<TokenValue, ReferenceError> {
        if let Some(target) = expr.single_reference() {
            return self.lookup(target, from);
        }

        let mut text = String::new();
        for segment in expr.segments() {
            match segment {
                Segment::Text(literal) => text.push_str(literal),
                Segment::Reference(target) => {
                    let value = self.lookup(target, from)?;
                    text.push_str(&value.to_string());
                }
            }
        }
        Ok(TokenValue::Text(text))
    }

    /// Same layer first, then the lower layers
    fn lookup(&mut self, target: &TokenPath, from: &TokenPath) -> Result<TokenValue, ReferenceError> {
        self.references += 1;

        let value = if self.entries.contains_key(target) {
            self.resolve_path(target)?
        } else if let Some(token) = self.lower.lookup(target) {
            token.value.clone()
        } else {
            let mut chain: Vec<String> = self.chain.iter().map(TokenPath::to_string).collect();
            chain.push(target.to_string());
            return Err(ReferenceError::UnresolvedReference {
                reference: target.to_string(),
                referenced_from: from.to_string(),
                layer: self.label.to_string(),
                chain,
            });
        };

        if self.log_details {
            log_debug!("Substituted reference",
                "layer" => self.label,
                "from" => from,
                "to" => target,
                "value" => &value);
        }
        Ok(value)
    }
}

/// Log a resolution error with a bounded rendering of its chain
fn report(error: &ReferenceError, label: &str, path: &impl std::fmt::Display) {
    let chain = error.chain();
    let rendered = if chain.len() > MAX_REPORTED_CHAIN_LENGTH {
        format!(
            "{} -> ... ({} more)",
            chain[..MAX_REPORTED_CHAIN_LENGTH].join(" -> "),
            chain.len() - MAX_REPORTED_CHAIN_LENGTH
        )
    } else {
        chain.join(" -> ")
    };

    log_error!(error.error_code(), &error.to_string(),
        at = path.to_string(),
        "layer" => label,
        "chain" => rendered);
}

/// Startup check that reference codes are registered
pub fn init_reference_logging() -> Result<(), String> {
    let reference_codes = [
        codes::references::MALFORMED_REFERENCE,
        codes::references::LEGACY_REFERENCE_SYNTAX,
        codes::references::UNRESOLVED_REFERENCE,
        codes::references::CYCLIC_REFERENCE,
        codes::references::REFERENCE_DEPTH_EXCEEDED,
        codes::references::NAME_CONFLICT,
    ];

    for code in &reference_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Reference error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Reference resolver configuration loaded",
        "max_reference_depth" => MAX_REFERENCE_DEPTH,
        "max_reported_chain_length" => MAX_REPORTED_CHAIN_LENGTH);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::parser::parse_document;
    use assert_matches::assert_matches;

    fn layer(layer: TokenLayer, json: &str) -> (TokenLayer, TokenNode) {
        (layer, parse_document(json, layer.as_str(), true).unwrap())
    }

    fn primitive() -> (TokenLayer, TokenNode) {
        layer(
            TokenLayer::Primitive,
            r##"{
                "color": {
                    "blue": { "500": { "$value": "#3b82f6" } },
                    "gray": { "200": { "$value": "#e5e7eb" } }
                },
                "space": { "unit": { "$value": 4 } }
            }"##,
        )
    }

    fn text(value: &str) -> TokenValue {
        TokenValue::text(value)
    }

    #[test]
    fn test_semantic_reference_to_primitive() {
        let layers = vec![
            primitive(),
            layer(
                TokenLayer::Semantic,
                r#"{"color": {"text": {"primary": {"$value": "{color.blue.500}"}}}}"#,
            ),
        ];

        let set = resolve(&layers).unwrap();
        assert_eq!(set.value("color-text-primary"), Some(&text("#3b82f6")));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_every_output_is_literal_and_reresolution_is_idempotent() {
        let layers = vec![
            primitive(),
            layer(
                TokenLayer::Semantic,
                r#"{
                    "border": { "default": { "$value": "1px solid {color.gray.200}" } },
                    "space": { "md": { "$value": "{space.unit}" } },
                    "color": { "accent": { "$value": "{color.text.link}" }, "text": { "link": { "$value": "{color.blue.500}" } } }
                }"#,
            ),
            layer(
                TokenLayer::Component,
                r#"{"button": {"bg": {"$value": "{color.accent}"}}}"#,
            ),
        ];

        let set = resolve(&layers).unwrap();
        assert_eq!(set.value("border-default"), Some(&text("1px solid #e5e7eb")));
        assert_eq!(set.value("button-bg"), Some(&text("#3b82f6")));
        assert_eq!(set.value("space-md").and_then(TokenValue::as_f64), Some(4.0));

        let again = resolve(&[(TokenLayer::Primitive, set.to_token_node())]).unwrap();
        assert_eq!(again, set);
    }

    #[test]
    fn test_layer_order_is_normalized() {
        let semantic = layer(
            TokenLayer::Semantic,
            r#"{"color": {"text": {"primary": {"$value": "{color.blue.500}"}}}}"#,
        );
        let forward = resolve(&[primitive(), semantic.clone()]).unwrap();
        let reversed = resolve(&[semantic, primitive()]).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let layers = vec![layer(
            TokenLayer::Primitive,
            r#"{"color": {"a": {"$value": "{color.a}"}}}"#,
        )];

        assert_matches!(
            resolve(&layers),
            Err(ReferenceError::CyclicReference { cycle, .. }) if cycle == vec!["color.a", "color.a"]
        );
    }

    #[test]
    fn test_multi_step_cycle_reports_chain() {
        let layers = vec![layer(
            TokenLayer::Semantic,
            r#"{"a": {"$value": "{b}"}, "b": {"$value": "{c}"}, "c": {"$value": "{a}"}}"#,
        )];

        assert_matches!(
            resolve(&layers),
            Err(ReferenceError::CyclicReference { cycle, layer }) if cycle == vec!["a", "b", "c", "a"] && layer == "semantic"
        );
    }

    #[test]
    fn test_cycle_entered_from_outside_reports_only_the_loop() {
        let layers = vec![layer(
            TokenLayer::Semantic,
            r#"{"a": {"$value": "{x}"}, "x": {"$value": "{y}"}, "y": {"$value": "{x}"}}"#,
        )];

        assert_matches!(
            resolve(&layers),
            Err(ReferenceError::CyclicReference { cycle, .. }) if cycle == vec!["x", "y", "x"]
        );
    }

    #[test]
    fn test_unresolved_reference_reports_chain() {
        let layers = vec![
            primitive(),
            layer(
                TokenLayer::Semantic,
                r#"{"a": {"$value": "{b}"}, "b": {"$value": "{color.missing}"}}"#,
            ),
        ];

        assert_matches!(
            resolve(&layers),
            Err(ReferenceError::UnresolvedReference { reference, referenced_from, chain, .. })
                if reference == "color.missing" && referenced_from == "b" && chain == vec!["a", "b", "color.missing"]
        );
    }

    #[test]
    fn test_lower_layer_cannot_reference_upward() {
        let layers = vec![
            layer(TokenLayer::Primitive, r#"{"base": {"$value": "{brand}"}}"#),
            layer(TokenLayer::Semantic, r##"{"brand": {"$value": "#f00"}}"##),
        ];

        assert_matches!(
            resolve(&layers),
            Err(ReferenceError::UnresolvedReference { layer, .. }) if layer == "primitive"
        );
    }

    #[test]
    fn test_later_layer_overrides_path() {
        let layers = vec![
            primitive(),
            layer(TokenLayer::Component, r##"{"color": {"blue": {"500": {"$value": "#2563eb"}}}}"##),
        ];

        let mut resolver = Resolver::new();
        let set = resolver.resolve(&layers).unwrap();
        assert_eq!(set.value("color-blue-500"), Some(&text("#2563eb")));
        assert_eq!(resolver.stats().cascade_overrides, 1);
        assert_eq!(resolver.stats().layers.len(), 2);
    }

    #[test]
    fn test_cross_layer_structural_conflict() {
        let layers = vec![
            primitive(),
            layer(TokenLayer::Semantic, r##"{"color": {"blue": {"$value": "#00f"}}}"##),
        ];

        assert_matches!(resolve(&layers), Err(ReferenceError::NameConflict { .. }));
    }

    #[test]
    fn test_long_chain_hits_depth_limit() {
        let mut json = String::from("{");
        for i in 0..=MAX_REFERENCE_DEPTH {
            json.push_str(&format!("\"t{}\": {{\"$value\": \"{{t{}}}\"}},", i, i + 1));
        }
        json.push_str(&format!("\"t{}\": {{\"$value\": \"end\"}}}}", MAX_REFERENCE_DEPTH + 1));

        let layers = vec![layer(TokenLayer::Primitive, &json)];
        assert_matches!(resolve(&layers), Err(ReferenceError::DepthExceeded { .. }));
    }

    #[test]
    fn test_deterministic_first_error() {
        let layers = vec![layer(
            TokenLayer::Semantic,
            r#"{"z": {"$value": "{missing.z}"}, "a": {"$value": "{missing.a}"}}"#,
        )];

        for _ in 0..3 {
            assert_matches!(
                resolve(&layers),
                Err(ReferenceError::UnresolvedReference { reference, .. }) if reference == "missing.a"
            );
        }
    }

    #[test]
    fn test_init_reference_logging() {
        assert!(init_reference_logging().is_ok());
    }
}
