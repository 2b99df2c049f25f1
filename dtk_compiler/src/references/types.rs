//! Resolved, literal-only token sets

use super::error::ReferenceError;
use crate::store::types::{TokenLeaf, TokenNode, TokenPath, TokenValue};
use serde::ser::{Serialize, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub path: TokenPath,
    pub value: TokenValue,
    pub token_type: Option<String>,
}

impl ResolvedToken {
    pub fn flat_name(&self) -> String {
        self.path.flat_name()
    }
}

/// Flat name -> literal value. No value is a reference, every flat name is
/// unique, and no token path is a prefix of another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTokenSet {
    tokens: BTreeMap<String, ResolvedToken>,
    paths: BTreeMap<TokenPath, String>,
}

impl ResolvedTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Look up by flattened name (`color-text-primary`)
    pub fn get(&self, flat_name: &str) -> Option<&ResolvedToken> {
        self.tokens.get(flat_name)
    }

    pub fn value(&self, flat_name: &str) -> Option<&TokenValue> {
        self.tokens.get(flat_name).map(|token| &token.value)
    }

    /// Look up by token path
    pub fn lookup(&self, path: &TokenPath) -> Option<&ResolvedToken> {
        self.paths.get(path).and_then(|flat| self.tokens.get(flat))
    }

    pub fn contains_path(&self, path: &TokenPath) -> bool {
        self.paths.contains_key(path)
    }

    /// Tokens in flat-name order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedToken> {
        self.tokens.values()
    }

    /// Tokens under a group, in path order
    pub fn under<'a>(&'a self, prefix: &'a TokenPath) -> impl Iterator<Item = &'a ResolvedToken> + 'a {
        self.paths
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(prefix))
            .filter_map(move |(_, flat)| self.tokens.get(flat))
    }

    /// Insert or replace a token, returning the value it replaced
    pub fn insert(&mut self, token: ResolvedToken) -> Result<Option<TokenValue>, ReferenceError> {
        let flat = token.flat_name();

        if let Some(existing) = self.tokens.get(&flat) {
            if existing.path != token.path {
                return Err(ReferenceError::NameConflict {
                    name: flat,
                    existing: existing.path.to_string(),
                    incoming: token.path.to_string(),
                });
            }
        } else if let Some(conflict) = self.structural_conflict(&token.path) {
            return Err(ReferenceError::NameConflict {
                name: flat,
                existing: conflict.to_string(),
                incoming: token.path.to_string(),
            });
        }

        self.paths.insert(token.path.clone(), flat.clone());
        Ok(self.tokens.insert(flat, token).map(|previous| previous.value))
    }

    /// A stored path that is an ancestor or a descendant of `path`
    fn structural_conflict(&self, path: &TokenPath) -> Option<&TokenPath> {
        let segments = path.segments();
        for len in 1..segments.len() {
            if let Some(ancestor) = TokenPath::from_segments(segments[..len].to_vec()) {
                if let Some((stored, _)) = self.paths.get_key_value(&ancestor) {
                    return Some(stored);
                }
            }
        }

        self.paths
            .range((Bound::Excluded(path.clone()), Bound::Unbounded))
            .next()
            .map(|(stored, _)| stored)
            .filter(|stored| stored.starts_with(path))
    }

    /// Rebuild a literal-only document tree
    pub fn to_token_node(&self) -> TokenNode {
        let mut root = TokenNode::empty_group();
        for token in self.tokens.values() {
            let mut leaf = TokenLeaf::literal(token.value.clone());
            leaf.token_type = token.token_type.clone();
            let inserted = root.insert_leaf(&token.path, leaf);
            debug_assert!(inserted, "resolved set holds a structural conflict");
        }
        root
    }
}

impl Serialize for ResolvedTokenSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.tokens.iter().map(|(flat, token)| (flat, &token.value)))
    }
}

/// Counters gathered while resolving
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ResolutionStats {
    pub layers: Vec<LayerStats>,
    pub references_resolved: usize,
    pub cascade_overrides: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct LayerStats {
    pub label: String,
    pub tokens: usize,
    pub references: usize,
}

impl ResolutionStats {
    pub fn total_tokens(&self) -> usize {
        self.layers.iter().map(|layer| layer.tokens).sum()
    }

    pub fn merge(&mut self, other: ResolutionStats) {
        self.layers.extend(other.layers);
        self.references_resolved += other.references_resolved;
        self.cascade_overrides += other.cascade_overrides;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn token(path: &str, value: &str) -> ResolvedToken {
        ResolvedToken {
            path: TokenPath::parse(path).unwrap(),
            value: TokenValue::text(value),
            token_type: None,
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut set = ResolvedTokenSet::new();
        assert_eq!(set.insert(token("color.text.primary", "#000")).unwrap(), None);
        assert_eq!(
            set.insert(token("color.text.primary", "#111")).unwrap(),
            Some(TokenValue::text("#000"))
        );

        assert_eq!(set.len(), 1);
        assert_eq!(set.value("color-text-primary"), Some(&TokenValue::text("#111")));
        assert!(set
            .lookup(&TokenPath::parse("color/text/primary").unwrap())
            .is_some());
    }

    #[test]
    fn test_flat_name_conflict() {
        let mut set = ResolvedTokenSet::new();
        set.insert(token("color.text-primary", "#000")).unwrap();

        assert_matches!(
            set.insert(token("color-text.primary", "#111")),
            Err(ReferenceError::NameConflict { name, .. }) if name == "color-text-primary"
        );
    }

    #[test]
    fn test_structural_conflict_both_directions() {
        let mut set = ResolvedTokenSet::new();
        set.insert(token("color.blue", "#00f")).unwrap();

        assert_matches!(
            set.insert(token("color.blue.500", "#3b82f6")),
            Err(ReferenceError::NameConflict { existing, .. }) if existing == "color.blue"
        );

        let mut set = ResolvedTokenSet::new();
        set.insert(token("space.md.x", "8px")).unwrap();
        assert_matches!(
            set.insert(token("space.md", "8px")),
            Err(ReferenceError::NameConflict { existing, .. }) if existing == "space.md.x"
        );
    }

    #[test]
    fn test_under_prefix() {
        let mut set = ResolvedTokenSet::new();
        set.insert(token("color.blue.500", "#3b82f6")).unwrap();
        set.insert(token("color.red.500", "#ef4444")).unwrap();
        set.insert(token("colors.legacy", "#000")).unwrap();
        set.insert(token("space.md", "8px")).unwrap();

        let color = TokenPath::parse("color").unwrap();
        let names: Vec<String> = set.under(&color).map(ResolvedToken::flat_name).collect();
        assert_eq!(names, vec!["color-blue-500", "color-red-500"]);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let mut set = ResolvedTokenSet::new();
        set.insert(token("space.md", "8px")).unwrap();
        set.insert(ResolvedToken {
            path: TokenPath::parse("scale.ratio").unwrap(),
            value: TokenValue::from(2),
            token_type: None,
        })
        .unwrap();

        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"scale-ratio":2,"space-md":"8px"}"#
        );
    }
}
