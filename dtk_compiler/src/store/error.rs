use crate::logging::{codes, Code};
use thiserror::Error;

/// Token store errors; both abort the pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Token source '{document}' is unavailable: {reason}")]
    SourceUnavailable { document: String, reason: String },

    #[error("Malformed token document '{document}'{}: {message}", at_location(.location))]
    MalformedDocument {
        document: String,
        location: Option<String>,
        message: String,
    },
}

fn at_location(location: &Option<String>) -> String {
    location
        .as_ref()
        .map(|l| format!(" at {}", l))
        .unwrap_or_default()
}

impl StoreError {
    pub fn source_unavailable(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            document: document.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            document: document.into(),
            location: None,
            message: message.into(),
        }
    }

    pub fn malformed_at(
        document: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedDocument {
            document: document.into(),
            location: Some(location.into()),
            message: message.into(),
        }
    }

    /// Identifier of the document that failed
    pub fn document(&self) -> &str {
        match self {
            StoreError::SourceUnavailable { document, .. } => document,
            StoreError::MalformedDocument { document, .. } => document,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            StoreError::SourceUnavailable { .. } => codes::store::SOURCE_UNAVAILABLE,
            StoreError::MalformedDocument { .. } => codes::store::MALFORMED_DOCUMENT,
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
