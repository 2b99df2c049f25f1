mod error;
mod info;
pub mod output;
mod sources;
mod stats;
mod validation;

// Re-export public types
pub use error::PipelineError;
pub use info::{get_pipeline_info, PipelineInfo};
pub use output::{BuildReport, PipelineOutput};
pub use sources::ThemeSources;
pub use stats::PipelineStats;
pub use validation::validate_pipeline;

use crate::config::runtime::{EmitterPreferences, ResolutionPreferences};
use crate::config::ProjectConfig;
use crate::emit::{self, DerivedConstants};
use crate::logging::codes;
use crate::references::{ResolvedTokenSet, Resolver};
use crate::store::{TokenLayer, TokenStore};
use crate::variants::{Expander, Variant, VariantOverrides};
use crate::{log_error, log_info, log_performance, log_success};
use std::collections::BTreeMap;
use std::time::Instant;

/// Build every artifact for a project (documents -> resolution -> variants -> stylesheet)
pub fn build_theme(config: &ProjectConfig) -> Result<PipelineOutput, PipelineError> {
    log_info!("Starting token build", "project" => &config.name);
    ThemeSources::from_config(config).build()
}

/// Build from an already populated store with default resolution preferences
pub fn build_from_store(
    store: &TokenStore,
    overrides: &VariantOverrides,
    emitter: &EmitterPreferences,
) -> Result<PipelineOutput, PipelineError> {
    run(store, overrides, emitter, &ResolutionPreferences::default())
}

pub(crate) fn run(
    store: &TokenStore,
    overrides: &VariantOverrides,
    emitter: &EmitterPreferences,
    resolution: &ResolutionPreferences,
) -> Result<PipelineOutput, PipelineError> {
    let start = Instant::now();

    run_stages(store, overrides, emitter, resolution, start).inspect_err(|error| {
        log_error!(codes::pipeline::PIPELINE_FAILURE, "Token build failed",
            "stage_code" => error.error_code(),
            "error" => error);
    })
}

fn run_stages(
    store: &TokenStore,
    overrides: &VariantOverrides,
    emitter: &EmitterPreferences,
    resolution: &ResolutionPreferences,
    start: Instant,
) -> Result<PipelineOutput, PipelineError> {
    // Stage 1: documents
    let layers = store.load_all()?;

    // Stage 2: cascade resolution, keeping the primitive layer on its own
    let mut resolver = Resolver::with_preferences(resolution.clone());
    let mut base = ResolvedTokenSet::new();
    let mut primitive = ResolvedTokenSet::new();
    for (layer, node) in &layers {
        base = resolver.resolve_against(node, layer.as_str(), &base)?;
        if *layer == TokenLayer::Primitive {
            primitive = base.clone();
        }
    }
    log_success!(codes::success::RESOLUTION_COMPLETE, "Token layers resolved",
        "layers" => layers.len(),
        "tokens" => base.len(),
        "references" => resolver.stats().references_resolved);

    // Stage 3: variants
    let mut expander = Expander::with_preferences(resolution.clone());
    let mut variants = BTreeMap::new();
    for variant in Variant::all() {
        let set = expander
            .expand_variant(&base, overrides, variant)
            .map_err(|source| PipelineError::Expansion { variant, source })?;
        variants.insert(variant, set);
    }
    log_success!(codes::success::EXPANSION_COMPLETE, "Variants expanded",
        "variants" => variants.len(),
        "overridden" => expander.stats().overridden_variants);

    // Stage 4: artifacts
    let stylesheet = emit::emit_checked(&variants, emitter)?;
    let constants = DerivedConstants::all();
    log_success!(codes::success::CONSTANTS_EMITTED, "Derived constants emitted",
        "density_levels" => constants.density_multipliers.len(),
        "theme_modes" => constants.theme_modes.len());

    let mut resolution_stats = resolver.into_stats();
    resolution_stats.merge(expander.resolution_stats().clone());

    let stats = PipelineStats {
        resolution: resolution_stats,
        expansion: expander.stats().clone(),
        override_documents: overrides.len(),
        base_tokens: base.len(),
        stylesheet_bytes: stylesheet.len(),
        duration: start.elapsed(),
    };

    log_performance!(codes::success::PIPELINE_COMPLETE, "Token build complete",
        duration = stats.duration,
        "tokens" => stats.base_tokens,
        "variants" => variants.len(),
        "stylesheet_bytes" => stats.stylesheet_bytes);

    Ok(PipelineOutput {
        base,
        primitive,
        variants,
        stylesheet,
        constants,
        stats,
    })
}
