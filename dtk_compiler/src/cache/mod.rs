//! Runtime Cache
//!
//! Process-wide memoization of the build. The full pipeline runs at most once
//! per `ThemeCache`; the stylesheet, variant sets and constants are derived
//! from that single result. Errors are cached too, and nothing is ever
//! invalidated: a restart is the only reset.

pub mod single_flight;

pub use single_flight::{Shared, SingleFlight};

use crate::config::compile_time::cache::MAX_CACHE_ENTRIES;
use crate::config::ProjectConfig;
use crate::emit::DerivedConstants;
use crate::logging::codes;
use crate::pipeline::{build_theme, PipelineError, PipelineOutput};
use crate::references::ResolvedTokenSet;
use crate::variants::Variant;
use crate::{log_debug, log_success};
use std::fmt;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Build,
    Stylesheet,
    Variant(Variant),
    Constants,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Build => f.write_str("build"),
            CacheKey::Stylesheet => f.write_str("stylesheet"),
            CacheKey::Variant(variant) => write!(f, "variant:{}", variant),
            CacheKey::Constants => f.write_str("constants"),
        }
    }
}

#[derive(Debug)]
pub enum CacheEntry {
    Build(Arc<PipelineOutput>),
    Stylesheet(Arc<str>),
    Variant(Arc<ResolvedTokenSet>),
    Constants(Arc<DerivedConstants>),
}

type Builder = Box<dyn Fn() -> Result<PipelineOutput, PipelineError> + Send + Sync>;

pub struct ThemeCache {
    builder: Builder,
    flights: SingleFlight<CacheKey, CacheEntry, PipelineError>,
}

impl ThemeCache {
    /// Cache over the files a project configuration names
    pub fn new(config: ProjectConfig) -> Self {
        Self::from_fn(move || build_theme(&config))
    }

    pub fn from_fn<F>(builder: F) -> Self
    where
        F: Fn() -> Result<PipelineOutput, PipelineError> + Send + Sync + 'static,
    {
        Self {
            builder: Box::new(builder),
            flights: SingleFlight::new(),
        }
    }

    fn entry<F>(&self, key: CacheKey, compute: F) -> Result<Arc<CacheEntry>, PipelineError>
    where
        F: FnOnce() -> Result<CacheEntry, PipelineError>,
    {
        self.flights
            .get_or_compute(&key, compute)
            .map_err(|error| (*error).clone())
    }

    /// Full pipeline output
    pub fn build(&self) -> Result<Arc<PipelineOutput>, PipelineError> {
        let entry = self.entry(CacheKey::Build, || {
            let output = (self.builder)()?;
            log_success!(codes::success::CACHE_POPULATED, "Token build cached",
                "tokens" => output.base.len(),
                "variants" => output.variants.len());
            Ok(CacheEntry::Build(Arc::new(output)))
        })?;
        match &*entry {
            CacheEntry::Build(output) => Ok(Arc::clone(output)),
            _ => Err(mismatch(CacheKey::Build)),
        }
    }

    pub fn stylesheet(&self) -> Result<Arc<str>, PipelineError> {
        let entry = self.entry(CacheKey::Stylesheet, || {
            Ok(CacheEntry::Stylesheet(Arc::from(self.build()?.stylesheet.as_str())))
        })?;
        match &*entry {
            CacheEntry::Stylesheet(css) => Ok(Arc::clone(css)),
            _ => Err(mismatch(CacheKey::Stylesheet)),
        }
    }

    pub fn variant_set(&self, variant: Variant) -> Result<Arc<ResolvedTokenSet>, PipelineError> {
        let key = CacheKey::Variant(variant);
        let entry = self.entry(key, || {
            let output = self.build()?;
            let set = output.variant(variant).cloned().ok_or_else(|| {
                PipelineError::pipeline_error(&format!("Build has no set for variant {}", variant))
            })?;
            Ok(CacheEntry::Variant(Arc::new(set)))
        })?;
        match &*entry {
            CacheEntry::Variant(set) => Ok(Arc::clone(set)),
            _ => Err(mismatch(key)),
        }
    }

    pub fn constants(&self) -> Result<Arc<DerivedConstants>, PipelineError> {
        let entry = self.entry(CacheKey::Constants, || {
            Ok(CacheEntry::Constants(Arc::new(self.build()?.constants.clone())))
        })?;
        match &*entry {
            CacheEntry::Constants(constants) => Ok(Arc::clone(constants)),
            _ => Err(mismatch(CacheKey::Constants)),
        }
    }

    pub fn entries(&self) -> usize {
        self.flights.len()
    }

    /// Computations actually run, across all keys
    pub fn computations(&self) -> usize {
        self.flights.computations()
    }
}

fn mismatch(key: CacheKey) -> PipelineError {
    PipelineError::pipeline_error(&format!("Cache entry for {} holds a different kind of value", key))
}

static GLOBAL_CACHE: OnceLock<ThemeCache> = OnceLock::new();

/// Install the process-wide cache; fails if one is already installed
pub fn init_global_cache(config: ProjectConfig) -> Result<&'static ThemeCache, String> {
    let name = config.name.clone();
    GLOBAL_CACHE
        .set(ThemeCache::new(config))
        .map_err(|_| "Global theme cache already initialized".to_string())?;

    log_debug!("Global theme cache installed", "project" => &name);

    GLOBAL_CACHE
        .get()
        .ok_or_else(|| "Global theme cache unavailable after initialization".to_string())
}

pub fn global_cache() -> Option<&'static ThemeCache> {
    GLOBAL_CACHE.get()
}

/// Startup check that cache codes are registered
pub fn init_cache_logging() -> Result<(), String> {
    for code in [codes::cache::CACHED_FAILURE, codes::cache::CACHE_CAPACITY_EXCEEDED] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Cache error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Cache compile-time configuration loaded",
        "max_cache_entries" => MAX_CACHE_ENTRIES);

    Ok(())
}
