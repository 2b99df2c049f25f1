//! JSON token document -> `TokenNode`
//!
//! A mapping with `$value` is a leaf; any other `$`-prefixed key is metadata
//! and skipped; every remaining key is a child group or leaf. Limits from the
//! compile-time profile are enforced while walking, so a hostile document is
//! rejected before it is fully materialized.

use super::error::StoreError;
use super::types::{is_valid_segment, RawValue, TokenLeaf, TokenNode, TokenPath, TokenValue};
use crate::config::compile_time::documents::{MAX_KEY_LENGTH, MAX_TOKENS_PER_LAYER, MAX_TREE_DEPTH};
use crate::config::constants::document::{DESCRIPTION_KEY, METADATA_PREFIX, TYPE_KEY, VALUE_KEY};
use crate::logging::{codes, Code};
use crate::references::syntax;
use crate::log_error;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Characters that would end or split a custom-property declaration
const DECLARATION_BREAKS: &[char] = &[';', '\n', '\r'];

struct ParseContext<'a> {
    document: &'a str,
    retain_metadata: bool,
    token_count: usize,
    flat_names: HashMap<String, TokenPath>,
}

impl ParseContext<'_> {
    fn fail(&self, code: Code, path: &TokenPath, message: impl Into<String>) -> StoreError {
        let message = message.into();
        let location = path.to_string();
        log_error!(code, &message, at = location, "document" => self.document);
        StoreError::malformed_at(self.document, location, message)
    }
}

/// Parse one layer or override document
pub fn parse_document(
    text: &str,
    document: &str,
    retain_metadata: bool,
) -> Result<TokenNode, StoreError> {
    let root: Value = serde_json::from_str(text).map_err(|e| {
        let location = format!("line {}, column {}", e.line(), e.column());
        log_error!(codes::store::MALFORMED_DOCUMENT, "Token document is not valid JSON",
            at = location,
            "document" => document,
            "json_error" => e);
        StoreError::malformed_at(document, location, format!("invalid JSON: {}", e))
    })?;

    let Value::Object(map) = root else {
        log_error!(codes::store::MALFORMED_DOCUMENT, "Token document root must be an object",
            "document" => document);
        return Err(StoreError::malformed(document, "root must be an object"));
    };

    if map.contains_key(VALUE_KEY) {
        log_error!(codes::store::MIXED_NODE, "Token document root cannot be a token",
            "document" => document);
        return Err(StoreError::malformed(document, "root cannot carry a $value"));
    }

    let mut context = ParseContext {
        document,
        retain_metadata,
        token_count: 0,
        flat_names: HashMap::new(),
    };

    let children = parse_group(&map, None, &mut context)?;
    Ok(TokenNode::Group(children))
}

fn parse_group(
    map: &Map<String, Value>,
    parent: Option<&TokenPath>,
    context: &mut ParseContext<'_>,
) -> Result<BTreeMap<String, TokenNode>, StoreError> {
    let mut children = BTreeMap::new();

    for (key, value) in map {
        if key.starts_with(METADATA_PREFIX) {
            continue;
        }

        let path = match parent {
            Some(parent) => parent.child(key),
            None => TokenPath::root(key),
        };

        if !is_valid_segment(key) || key.len() > MAX_KEY_LENGTH {
            return Err(context.fail(
                codes::store::INVALID_KEY,
                &path,
                format!("'{}' is not a valid token name", key),
            ));
        }

        if path.len() > MAX_TREE_DEPTH {
            return Err(context.fail(
                codes::store::TREE_TOO_DEEP,
                &path,
                format!("nesting exceeds {} levels", MAX_TREE_DEPTH),
            ));
        }

        let Value::Object(child) = value else {
            return Err(context.fail(
                codes::store::MALFORMED_DOCUMENT,
                &path,
                "expected a group or a token with $value",
            ));
        };

        let node = if child.contains_key(VALUE_KEY) {
            TokenNode::Leaf(parse_leaf(child, &path, context)?)
        } else {
            TokenNode::Group(parse_group(child, Some(&path), context)?)
        };
        children.insert(key.clone(), node);
    }

    Ok(children)
}

fn parse_leaf(
    map: &Map<String, Value>,
    path: &TokenPath,
    context: &mut ParseContext<'_>,
) -> Result<TokenLeaf, StoreError> {
    if let Some(child) = map.keys().find(|k| !k.starts_with(METADATA_PREFIX)) {
        return Err(context.fail(
            codes::store::MIXED_NODE,
            path,
            format!("token with $value also defines child '{}'", child),
        ));
    }

    let value = match &map[VALUE_KEY] {
        Value::String(text) if text.contains(DECLARATION_BREAKS) => {
            return Err(context.fail(
                codes::store::INVALID_LEAF_VALUE,
                path,
                "$value must not contain ';' or line breaks".to_string(),
            ))
        }
        Value::String(text) => syntax::parse_value(text)
            .map_err(|e| context.fail(e.error_code(), path, e.to_string()))?,
        Value::Number(number) => RawValue::Literal(TokenValue::Number(number.clone())),
        other => {
            return Err(context.fail(
                codes::store::INVALID_LEAF_VALUE,
                path,
                format!("$value must be a string or number, found {}", json_kind(other)),
            ))
        }
    };

    context.token_count += 1;
    if context.token_count > MAX_TOKENS_PER_LAYER {
        return Err(context.fail(
            codes::store::TOO_MANY_TOKENS,
            path,
            format!("document defines more than {} tokens", MAX_TOKENS_PER_LAYER),
        ));
    }

    let flat = path.flat_name();
    if let Some(existing) = context.flat_names.get(&flat) {
        let message = format!("'{}' and '{}' both flatten to '{}'", existing, path, flat);
        return Err(context.fail(codes::references::NAME_CONFLICT, path, message));
    }
    context.flat_names.insert(flat, path.clone());

    let metadata = |key: &str| {
        if context.retain_metadata {
            map.get(key).and_then(Value::as_str).map(str::to_string)
        } else {
            None
        }
    };

    Ok(TokenLeaf {
        value,
        token_type: metadata(TYPE_KEY),
        description: metadata(DESCRIPTION_KEY),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
