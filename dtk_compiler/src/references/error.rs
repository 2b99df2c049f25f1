use crate::logging::{codes, Code};
use thiserror::Error;

/// Resolution failures; fatal for the build that hit them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("Unresolved reference '{reference}' from '{referenced_from}' in {layer} layer")]
    UnresolvedReference {
        reference: String,
        referenced_from: String,
        layer: String,
        /// Substitution chain ending at the missing target
        chain: Vec<String>,
    },

    #[error("Cyclic reference in {layer} layer: {}", .cycle.join(" -> "))]
    CyclicReference {
        /// Closes on the repeated path: `a -> b -> a`
        cycle: Vec<String>,
        layer: String,
    },

    #[error("Reference chain from '{path}' exceeds maximum depth {max_depth}")]
    DepthExceeded {
        path: String,
        depth: usize,
        max_depth: usize,
    },

    #[error("Token '{incoming}' conflicts with '{existing}' (property name '{name}')")]
    NameConflict {
        name: String,
        existing: String,
        incoming: String,
    },
}

impl ReferenceError {
    pub fn error_code(&self) -> Code {
        match self {
            ReferenceError::UnresolvedReference { .. } => codes::references::UNRESOLVED_REFERENCE,
            ReferenceError::CyclicReference { .. } => codes::references::CYCLIC_REFERENCE,
            ReferenceError::DepthExceeded { .. } => codes::references::REFERENCE_DEPTH_EXCEEDED,
            ReferenceError::NameConflict { .. } => codes::references::NAME_CONFLICT,
        }
    }

    /// The path chain that locates the offending token
    pub fn chain(&self) -> Vec<String> {
        match self {
            ReferenceError::UnresolvedReference { chain, .. } => chain.clone(),
            ReferenceError::CyclicReference { cycle, .. } => cycle.clone(),
            ReferenceError::DepthExceeded { path, .. } => vec![path.clone()],
            ReferenceError::NameConflict {
                existing, incoming, ..
            } => vec![existing.clone(), incoming.clone()],
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_joins_chain() {
        let error = ReferenceError::CyclicReference {
            cycle: vec!["a".into(), "b".into(), "a".into()],
            layer: "semantic".into(),
        };
        assert_eq!(error.to_string(), "Cyclic reference in semantic layer: a -> b -> a");
        assert_eq!(error.error_code().as_str(), "E023");
        assert!(error.requires_halt());
    }

    #[test]
    fn test_chain_accessor() {
        let error = ReferenceError::UnresolvedReference {
            reference: "color.missing".into(),
            referenced_from: "color.text".into(),
            layer: "semantic".into(),
            chain: vec!["color.text".into(), "color.missing".into()],
        };
        assert_eq!(error.chain(), vec!["color.text", "color.missing"]);
        assert_eq!(error.category(), "References");
    }
}
