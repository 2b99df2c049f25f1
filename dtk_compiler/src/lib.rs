// Internal modules
pub mod cache;
pub mod config;
pub mod emit;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod references;
pub mod store;
pub mod variants;

// Re-export key types for library consumers
pub use cache::{global_cache, init_global_cache, ThemeCache};
pub use config::ProjectConfig;
pub use pipeline::{build_from_store, build_theme, PipelineError, PipelineOutput};
pub use references::{ResolvedToken, ResolvedTokenSet};
pub use store::{TokenLayer, TokenPath, TokenValue};
pub use variants::{DensityLevel, ThemeMode, Variant};
