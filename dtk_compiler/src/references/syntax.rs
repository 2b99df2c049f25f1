//! Reference mini-language inside `$value` strings
//!
//! `{color.blue.500}` (or `{color/blue/500}`) refers to another token. A value
//! that is exactly one reference takes the target's value verbatim; text mixed
//! with references is interpolated. The older `$color.blue.500` notation is
//! rejected with a hint pointing at the brace form.

use crate::config::compile_time::references::MAX_REFERENCES_PER_VALUE;
use crate::config::constants::reference::{CLOSE, OPEN, SEPARATORS};
use crate::logging::{codes, Code};
use crate::store::types::{RawValue, TokenPath, TokenValue};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Reference(TokenPath),
}

/// A parsed `$value` containing at least one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueExpr {
    segments: Vec<Segment>,
}

impl ValueExpr {
    pub fn reference(path: TokenPath) -> Self {
        Self {
            segments: vec![Segment::Reference(path)],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn references(&self) -> impl Iterator<Item = &TokenPath> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Reference(path) => Some(path),
            Segment::Text(_) => None,
        })
    }

    /// The target when the whole value is one reference
    pub fn single_reference(&self) -> Option<&TokenPath> {
        match self.segments.as_slice() {
            [Segment::Reference(path)] => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Reference(path) => write!(f, "{}{}{}", OPEN, path, CLOSE)?,
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unclosed '{{' at offset {offset}")]
    Unclosed { offset: usize },

    #[error("nested '{{' at offset {offset}")]
    Nested { offset: usize },

    #[error("unexpected '}}' at offset {offset}")]
    StrayClose { offset: usize },

    #[error("empty reference at offset {offset}")]
    Empty { offset: usize },

    #[error("'{text}' is not a valid token path")]
    InvalidPath { text: String },

    #[error("more than {max} references in one value")]
    TooManyReferences { max: usize },

    #[error("legacy reference '{text}', write '{{{suggestion}}}' instead")]
    Legacy { text: String, suggestion: String },
}

impl SyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::Legacy { .. } => codes::references::LEGACY_REFERENCE_SYNTAX,
            _ => codes::references::MALFORMED_REFERENCE,
        }
    }
}

/// Parse a `$value` string into a literal or a reference expression
pub fn parse_value(text: &str) -> Result<RawValue, SyntaxError> {
    if let Some(legacy) = find_legacy_reference(text) {
        return Err(SyntaxError::Legacy {
            text: legacy.to_string(),
            suggestion: legacy[1..].to_string(),
        });
    }

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut reference_count = 0;
    let mut chars = text.char_indices();

    while let Some((offset, c)) = chars.next() {
        if c == CLOSE {
            return Err(SyntaxError::StrayClose { offset });
        }
        if c != OPEN {
            literal.push(c);
            continue;
        }

        let mut inner = String::new();
        let mut closed = false;
        for (inner_offset, c) in chars.by_ref() {
            if c == CLOSE {
                closed = true;
                break;
            }
            if c == OPEN {
                return Err(SyntaxError::Nested {
                    offset: inner_offset,
                });
            }
            inner.push(c);
        }
        if !closed {
            return Err(SyntaxError::Unclosed { offset });
        }

        let trimmed = inner.trim();
        if trimmed.is_empty() {
            return Err(SyntaxError::Empty { offset });
        }
        let path = TokenPath::parse(trimmed).ok_or_else(|| SyntaxError::InvalidPath {
            text: trimmed.to_string(),
        })?;

        reference_count += 1;
        if reference_count > MAX_REFERENCES_PER_VALUE {
            return Err(SyntaxError::TooManyReferences {
                max: MAX_REFERENCES_PER_VALUE,
            });
        }

        if !literal.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Reference(path));
    }

    if segments.is_empty() {
        return Ok(RawValue::Literal(TokenValue::Text(literal)));
    }
    if !literal.is_empty() {
        segments.push(Segment::Text(literal));
    }
    Ok(RawValue::Expression(ValueExpr { segments }))
}

/// `$` + letter + a dotted path of at least two segments
fn find_legacy_reference(text: &str) -> Option<&str> {
    let is_path_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || SEPARATORS.contains(&c);

    for (start, _) in text.match_indices('$') {
        let rest = &text[start + 1..];
        if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }
        let len = rest.find(|c: char| !is_path_char(c)).unwrap_or(rest.len());
        let candidate = rest[..len].trim_end_matches(SEPARATORS);
        if let Some(path) = TokenPath::parse(candidate) {
            if path.len() >= 2 {
                return Some(&text[start..start + 1 + candidate.len()]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn path(text: &str) -> TokenPath {
        TokenPath::parse(text).unwrap()
    }

    #[test]
    fn test_plain_text_is_literal() {
        assert_eq!(
            parse_value("#3b82f6").unwrap(),
            RawValue::Literal(TokenValue::text("#3b82f6"))
        );
        assert_eq!(
            parse_value("$5 off").unwrap(),
            RawValue::Literal(TokenValue::text("$5 off"))
        );
    }

    #[test]
    fn test_single_reference() {
        let RawValue::Expression(expr) = parse_value("{color.blue.500}").unwrap() else {
            panic!("expected an expression");
        };
        assert_eq!(expr.single_reference(), Some(&path("color.blue.500")));
    }

    #[test]
    fn test_slash_separators_and_padding() {
        let RawValue::Expression(expr) = parse_value("{ color/blue/500 }").unwrap() else {
            panic!("expected an expression");
        };
        assert_eq!(expr.single_reference(), Some(&path("color.blue.500")));
        assert_eq!(expr.to_string(), "{color.blue.500}");
    }

    #[test]
    fn test_interpolated_value() {
        let RawValue::Expression(expr) = parse_value("1px solid {color.border}").unwrap() else {
            panic!("expected an expression");
        };
        assert!(expr.single_reference().is_none());
        assert_eq!(expr.references().count(), 1);
        assert_eq!(
            expr.segments(),
            &[
                Segment::Text("1px solid ".to_string()),
                Segment::Reference(path("color.border")),
            ]
        );
    }

    #[test]
    fn test_malformed_references() {
        assert_matches!(parse_value("{color.blue"), Err(SyntaxError::Unclosed { offset: 0 }));
        assert_matches!(parse_value("{a{b}}"), Err(SyntaxError::Nested { offset: 2 }));
        assert_matches!(parse_value("a}"), Err(SyntaxError::StrayClose { offset: 1 }));
        assert_matches!(parse_value("{ }"), Err(SyntaxError::Empty { .. }));
        assert_matches!(parse_value("{color..blue}"), Err(SyntaxError::InvalidPath { .. }));
    }

    #[test]
    fn test_too_many_references() {
        let text = "{a}".repeat(MAX_REFERENCES_PER_VALUE + 1);
        assert_matches!(parse_value(&text), Err(SyntaxError::TooManyReferences { .. }));
    }

    #[test]
    fn test_legacy_notation_is_rejected() {
        let error = parse_value("$color.text.primary").unwrap_err();
        assert_eq!(
            error,
            SyntaxError::Legacy {
                text: "$color.text.primary".to_string(),
                suggestion: "color.text.primary".to_string(),
            }
        );
        assert_eq!(error.error_code(), codes::references::LEGACY_REFERENCE_SYNTAX);
        assert!(error.to_string().contains("{color.text.primary}"));
    }
}
