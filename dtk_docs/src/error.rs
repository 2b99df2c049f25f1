use dtk_compiler::logging::{codes, Code};
use std::path::Path;
use thiserror::Error;

/// Load failures inside the bridge. These never leave the crate: the bridge
/// logs them as warnings and falls back to empty data.
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum DocsError {
    #[error("Component manifest '{path}' unavailable: {reason}")]
    ManifestUnavailable { path: String, reason: String },

    #[error("Component manifest '{path}' malformed: {message}")]
    ManifestMalformed { path: String, message: String },

    #[error("Usage examples '{path}' unavailable: {reason}")]
    ExamplesUnavailable { path: String, reason: String },

    #[error("Usage examples '{path}' malformed: {message}")]
    ExamplesMalformed { path: String, message: String },

    #[error("Color swatches unavailable: {reason}")]
    SwatchesUnavailable { reason: String },

    #[error("More than {limit} {what}; the rest are ignored")]
    LimitExceeded { what: &'static str, limit: usize },
}

impl DocsError {
    pub(crate) fn manifest_unavailable(path: &Path, reason: impl ToString) -> Self {
        Self::ManifestUnavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn manifest_malformed(path: &Path, message: impl ToString) -> Self {
        Self::ManifestMalformed {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn examples_unavailable(path: &Path, reason: impl ToString) -> Self {
        Self::ExamplesUnavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn examples_malformed(path: &Path, message: impl ToString) -> Self {
        Self::ExamplesMalformed {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn warning_code(&self) -> Code {
        match self {
            DocsError::ManifestUnavailable { .. } => codes::docs::MANIFEST_UNAVAILABLE,
            DocsError::ManifestMalformed { .. } => codes::docs::MANIFEST_MALFORMED,
            DocsError::ExamplesUnavailable { .. } => codes::docs::EXAMPLES_UNAVAILABLE,
            DocsError::ExamplesMalformed { .. } => codes::docs::EXAMPLES_MALFORMED,
            DocsError::SwatchesUnavailable { .. } => codes::docs::SWATCHES_UNAVAILABLE,
            DocsError::LimitExceeded { .. } => codes::docs::DOCS_LIMIT_EXCEEDED,
        }
    }

    /// Log as a warning and return the message kept in `load_warnings`
    pub(crate) fn report(&self) -> String {
        let message = self.to_string();
        dtk_compiler::log_warning!(code = self.warning_code(), &message);
        message
    }
}
