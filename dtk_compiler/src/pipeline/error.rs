use crate::config::ConfigError;
use crate::emit::EmitError;
use crate::logging::{codes, Code};
use crate::references::ReferenceError;
use crate::store::StoreError;
use crate::variants::Variant;
use thiserror::Error;

/// Any stage failure; no stylesheet is produced when one occurs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Project configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Token store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Reference resolution failed: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Variant {variant} failed: {source}")]
    Expansion {
        variant: Variant,
        #[source]
        source: ReferenceError,
    },

    #[error("Stylesheet emission failed: {0}")]
    Emit(#[from] EmitError),

    #[error("Cannot write '{path}': {reason}")]
    Output { path: String, reason: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn output(path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::Output {
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }

    /// Code of the underlying stage error
    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::Config(e) => e.error_code(),
            PipelineError::Store(e) => e.error_code(),
            PipelineError::Reference(e) => e.error_code(),
            PipelineError::Expansion { .. } => codes::variants::OVERRIDE_RESOLUTION_FAILED,
            PipelineError::Emit(e) => e.error_code(),
            PipelineError::Output { .. } => codes::pipeline::OUTPUT_WRITE_FAILURE,
            PipelineError::Pipeline { .. } => codes::pipeline::PIPELINE_FAILURE,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}
