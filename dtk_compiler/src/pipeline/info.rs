use crate::config::compile_time::{cache, documents, references};
use crate::variants::{DensityLevel, ThemeMode, Variant};

/// Information about pipeline capabilities
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub pipeline_stages: usize,
    pub layers: Vec<&'static str>,
    pub theme_modes: Vec<&'static str>,
    pub density_levels: Vec<&'static str>,
    pub variants: usize,
    pub max_document_size: u64,
    pub max_reference_depth: usize,
    pub max_cache_entries: usize,
    pub reference_notation: &'static str,
    pub profile: &'static str,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "Design Token Pipeline:\n\
             - Pipeline Stages: {}\n\
             - Layers: {}\n\
             - Theme Modes: {}\n\
             - Density Levels: {}\n\
             - Variants: {}\n\
             - Reference Notation: {}\n\
             - Max Document Size: {} MB\n\
             - Max Reference Depth: {}\n\
             - Max Cache Entries: {}\n\
             - Build Profile: {}",
            self.pipeline_stages,
            self.layers.join(", "),
            self.theme_modes.join(", "),
            self.density_levels.join(", "),
            self.variants,
            self.reference_notation,
            self.max_document_size / (1024 * 1024),
            self.max_reference_depth,
            self.max_cache_entries,
            self.profile
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage token compiler: {} layers, {} variants ({} profile)",
            self.pipeline_stages,
            self.layers.len(),
            self.variants,
            self.profile
        )
    }
}

/// Get pipeline capabilities information
pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        pipeline_stages: 4,
        layers: crate::store::TokenStore::list_layers()
            .iter()
            .map(|layer| layer.as_str())
            .collect(),
        theme_modes: ThemeMode::ALL.iter().map(ThemeMode::as_str).collect(),
        density_levels: DensityLevel::ALL.iter().map(DensityLevel::as_str).collect(),
        variants: Variant::all().len(),
        max_document_size: documents::MAX_DOCUMENT_SIZE,
        max_reference_depth: references::MAX_REFERENCE_DEPTH,
        max_cache_entries: cache::MAX_CACHE_ENTRIES,
        reference_notation: "{group.token}",
        profile: crate::config::build_info::profile(),
    }
}
