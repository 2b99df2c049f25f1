//! Usage examples document
//!
//! Accepts either `{"examples": [...]}` or a bare array. Each example names
//! the component it demonstrates in `solution.component`, or several in
//! `solution.components`.

use crate::error::DocsError;
use dtk_compiler::config::compile_time::docs::MAX_EXAMPLES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleSolution {
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageExample {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub solution: ExampleSolution,
}

impl UsageExample {
    /// True when `name` is the example's component or one of its components
    pub fn demonstrates(&self, name: &str) -> bool {
        self.solution.component.as_deref() == Some(name)
            || self.solution.components.iter().any(|component| component == name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExamplesDocument {
    Wrapped { examples: Vec<UsageExample> },
    Bare(Vec<UsageExample>),
}

pub(crate) fn load_examples(path: &Path) -> (Vec<UsageExample>, Vec<DocsError>) {
    let parsed = fs::read_to_string(path)
        .map_err(|e| DocsError::examples_unavailable(path, e))
        .and_then(|text| {
            serde_json::from_str::<ExamplesDocument>(&text)
                .map_err(|e| DocsError::examples_malformed(path, e))
        });

    let mut examples = match parsed {
        Ok(ExamplesDocument::Wrapped { examples }) | Ok(ExamplesDocument::Bare(examples)) => examples,
        Err(error) => return (Vec::new(), vec![error]),
    };

    let mut problems = Vec::new();
    if examples.len() > MAX_EXAMPLES {
        examples.truncate(MAX_EXAMPLES);
        problems.push(DocsError::LimitExceeded {
            what: "usage examples",
            limit: MAX_EXAMPLES,
        });
    }
    (examples, problems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn example(title: &str, component: Option<&str>, components: &[&str]) -> UsageExample {
        UsageExample {
            id: None,
            title: title.to_string(),
            description: String::new(),
            solution: ExampleSolution {
                component: component.map(str::to_string),
                components: components.iter().map(|c| c.to_string()).collect(),
                code: None,
            },
        }
    }

    #[test]
    fn test_demonstrates() {
        assert!(example("single", Some("Button"), &[]).demonstrates("Button"));
        assert!(example("multi", None, &["Button", "Input"]).demonstrates("Input"));
        assert!(!example("other", Some("Card"), &["Badge"]).demonstrates("Button"));
        assert!(!example("case", Some("button"), &[]).demonstrates("Button"));
    }

    #[test]
    fn test_both_document_shapes() {
        let dir = tempdir().unwrap();
        let wrapped = dir.path().join("wrapped.json");
        let bare = dir.path().join("bare.json");
        fs::write(&wrapped, r#"{"examples": [{"title": "A", "solution": {"component": "Button"}}]}"#).unwrap();
        fs::write(&bare, r#"[{"title": "B"}, {"title": "C"}]"#).unwrap();

        let (examples, problems) = load_examples(&wrapped);
        assert_eq!(examples.len(), 1);
        assert!(problems.is_empty());

        let (examples, _) = load_examples(&bare);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].solution, ExampleSolution::default());
    }

    #[test]
    fn test_malformed_examples_are_soft() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("examples.json");
        fs::write(&path, r#"{"examples": "nope"}"#).unwrap();

        let (examples, problems) = load_examples(&path);
        assert!(examples.is_empty());
        assert!(matches!(problems[0], DocsError::ExamplesMalformed { .. }));
    }
}
