use super::error::PipelineError;
use super::stats::PipelineStats;
use crate::emit::DerivedConstants;
use crate::logging::codes;
use crate::references::ResolvedTokenSet;
use crate::variants::Variant;
use crate::{log_error, log_success};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const STYLESHEET_FILE: &str = "tokens.css";
pub const CONSTANTS_TS_FILE: &str = "tokens.constants.ts";
pub const CONSTANTS_JSON_FILE: &str = "tokens.constants.json";
pub const BUILD_REPORT_FILE: &str = "build-report.json";

/// Everything one successful build produces
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Cascade result before any variant override
    pub base: ResolvedTokenSet,
    /// The primitive layer alone, for swatch listings
    pub primitive: ResolvedTokenSet,
    pub variants: BTreeMap<Variant, ResolvedTokenSet>,
    pub stylesheet: String,
    pub constants: DerivedConstants,
    pub stats: PipelineStats,
}

/// Serializable summary written next to the artifacts
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub build_id: String,
    pub project: String,
    pub generated_at: DateTime<Utc>,
    pub compiler_version: &'static str,
    pub tokens: usize,
    pub variants: BTreeMap<String, usize>,
    pub stylesheet_bytes: usize,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    pub fn variant(&self, variant: Variant) -> Option<&ResolvedTokenSet> {
        self.variants.get(&variant)
    }

    pub fn report(&self, build_id: impl Into<String>, project: impl Into<String>) -> BuildReport {
        BuildReport {
            build_id: build_id.into(),
            project: project.into(),
            generated_at: Utc::now(),
            compiler_version: env!("CARGO_PKG_VERSION"),
            tokens: self.base.len(),
            variants: self
                .variants
                .iter()
                .map(|(variant, set)| (variant.to_string(), set.len()))
                .collect(),
            stylesheet_bytes: self.stylesheet.len(),
            stats: self.stats.clone(),
        }
    }

    /// Write the stylesheet, both constant renderings and the build report
    /// into `directory`, creating it if needed
    pub fn write_artifacts(
        &self,
        directory: &Path,
        report: &BuildReport,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        fs::create_dir_all(directory).map_err(|e| write_failure(directory, &e))?;

        let constants_json = self
            .constants
            .to_json()
            .map_err(|e| PipelineError::pipeline_error(&format!("Cannot serialize constants: {}", e)))?;
        let report_json = serde_json::to_string_pretty(report)
            .map_err(|e| PipelineError::pipeline_error(&format!("Cannot serialize build report: {}", e)))?;

        let artifacts = [
            (STYLESHEET_FILE, self.stylesheet.clone()),
            (CONSTANTS_TS_FILE, self.constants.to_typescript()),
            (CONSTANTS_JSON_FILE, constants_json),
            (BUILD_REPORT_FILE, report_json),
        ];

        let mut written = Vec::with_capacity(artifacts.len());
        for (name, contents) in artifacts {
            let path = directory.join(name);
            fs::write(&path, contents).map_err(|e| write_failure(&path, &e))?;
            written.push(path);
        }

        log_success!(codes::success::ARTIFACTS_WRITTEN, "Build artifacts written",
            "directory" => directory.display(),
            "files" => written.len(),
            "build_id" => &report.build_id);

        Ok(written)
    }
}

fn write_failure(path: &Path, error: &std::io::Error) -> PipelineError {
    let error = PipelineError::output(path, error);
    log_error!(error.error_code(), "Cannot write build artifact",
        "path" => path.display(),
        "error" => &error);
    error
}
