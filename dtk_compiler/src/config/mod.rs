//! Configuration module for the token compiler
//! Combines generated compile-time limits, runtime preferences and project files

// Include generated constants from build.rs
// This file is generated at compile time from config/<profile>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod constants;
pub mod project;
pub mod runtime;

pub use project::{
    ConfigError, DocsSources, EmitterOptions, LayerSources, OutputOptions, OverrideSource,
    ProjectConfig, DEFAULT_CONFIG_FILE,
};
pub use runtime::{
    EmitterPreferences, LoggingPreferences, ResolutionPreferences, RuntimeConfig,
    StorePreferences,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("DTK_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("DTK_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
