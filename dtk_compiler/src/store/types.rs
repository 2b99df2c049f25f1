//! Strongly-typed token tree produced at the document boundary

use crate::config::constants::reference::{DISPLAY_SEPARATOR, FLAT_SEPARATOR, SEPARATORS};
use crate::references::syntax::ValueExpr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A literal design value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Number(serde_json::Number),
    Text(String),
}

impl TokenValue {
    pub fn text(value: impl Into<String>) -> Self {
        TokenValue::Text(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TokenValue::Number(number) => number.as_f64(),
            TokenValue::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, TokenValue::Number(_))
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(number) => write!(f, "{}", number),
            TokenValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        TokenValue::Text(value.to_string())
    }
}

impl From<i64> for TokenValue {
    fn from(value: i64) -> Self {
        TokenValue::Number(value.into())
    }
}

/// Address of one token within a layer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenPath {
    segments: Vec<String>,
}

impl TokenPath {
    /// Parse dot- or slash-delimited text; `None` for empty or invalid segments
    pub fn parse(text: &str) -> Option<Self> {
        let segments: Vec<String> = text.split(SEPARATORS).map(str::to_string).collect();
        if segments.iter().all(|segment| is_valid_segment(segment)) {
            Some(Self { segments })
        } else {
            None
        }
    }

    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if !segments.is_empty() && segments.iter().all(|s| is_valid_segment(s)) {
            Some(Self { segments })
        } else {
            None
        }
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn root(segment: &str) -> Self {
        Self {
            segments: vec![segment.to_string()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn starts_with(&self, prefix: &TokenPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// `color.text.primary` -> `color-text-primary`
    pub fn flat_name(&self) -> String {
        self.segments.join(&FLAT_SEPARATOR.to_string())
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(&DISPLAY_SEPARATOR.to_string()))
    }
}

impl Serialize for TokenPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Characters allowed in a group or token key
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Layers of the token cascade, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenLayer {
    Primitive,
    Semantic,
    Component,
}

impl TokenLayer {
    pub const ALL: [TokenLayer; 3] = [
        TokenLayer::Primitive,
        TokenLayer::Semantic,
        TokenLayer::Component,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenLayer::Primitive => "primitive",
            TokenLayer::Semantic => "semantic",
            TokenLayer::Component => "component",
        }
    }
}

impl fmt::Display for TokenLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf value before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Literal(TokenValue),
    Expression(ValueExpr),
}

impl RawValue {
    pub fn as_literal(&self) -> Option<&TokenValue> {
        match self {
            RawValue::Literal(value) => Some(value),
            RawValue::Expression(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLeaf {
    pub value: RawValue,
    pub token_type: Option<String>,
    pub description: Option<String>,
}

impl TokenLeaf {
    pub fn literal(value: impl Into<TokenValue>) -> Self {
        Self {
            value: RawValue::Literal(value.into()),
            token_type: None,
            description: None,
        }
    }

    pub fn expression(expr: ValueExpr) -> Self {
        Self {
            value: RawValue::Expression(expr),
            token_type: None,
            description: None,
        }
    }
}

/// A document tree: every node is either a leaf or a group, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenNode {
    Leaf(TokenLeaf),
    Group(BTreeMap<String, TokenNode>),
}

impl TokenNode {
    pub fn empty_group() -> Self {
        TokenNode::Group(BTreeMap::new())
    }

    pub fn get(&self, path: &TokenPath) -> Option<&TokenNode> {
        let mut node = self;
        for segment in path.segments() {
            match node {
                TokenNode::Group(children) => node = children.get(segment)?,
                TokenNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    pub fn get_leaf(&self, path: &TokenPath) -> Option<&TokenLeaf> {
        match self.get(path)? {
            TokenNode::Leaf(leaf) => Some(leaf),
            TokenNode::Group(_) => None,
        }
    }

    /// All leaves with their paths, in sorted path order
    pub fn leaves(&self) -> Vec<(TokenPath, &TokenLeaf)> {
        let mut out = Vec::new();
        if let TokenNode::Group(children) = self {
            for (key, child) in children {
                collect_leaves(child, TokenPath::root(key), &mut out);
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TokenNode::Leaf(_) => 1,
            TokenNode::Group(children) => children.values().map(TokenNode::leaf_count).sum(),
        }
    }

    /// Insert or replace a leaf, creating groups on the way.
    /// Returns false when the path runs through a leaf or lands on a group.
    pub fn insert_leaf(&mut self, path: &TokenPath, leaf: TokenLeaf) -> bool {
        let Some((last, parents)) = path.segments().split_last() else {
            return false;
        };

        let mut node = self;
        for segment in parents {
            let TokenNode::Group(children) = node else {
                return false;
            };
            node = children
                .entry(segment.clone())
                .or_insert_with(TokenNode::empty_group);
        }

        let TokenNode::Group(children) = node else {
            return false;
        };
        if let Some(TokenNode::Group(_)) = children.get(last) {
            return false;
        }
        children.insert(last.clone(), TokenNode::Leaf(leaf));
        true
    }
}

fn collect_leaves<'a>(node: &'a TokenNode, path: TokenPath, out: &mut Vec<(TokenPath, &'a TokenLeaf)>) {
    match node {
        TokenNode::Leaf(leaf) => out.push((path, leaf)),
        TokenNode::Group(children) => {
            for (key, child) in children {
                collect_leaves(child, path.child(key), out);
            }
        }
    }
}
