// RUNTIME PREFERENCES (User Experience)

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorePreferences {
    /// Whether to log document size and parse timing
    pub enable_performance_logging: bool,

    /// Whether to keep `$type` / `$description` on parsed leaves
    pub retain_metadata: bool,
}

impl Default for StorePreferences {
    fn default() -> Self {
        Self {
            enable_performance_logging: env::var("DTK_STORE_PERFORMANCE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            retain_metadata: env::var("DTK_STORE_RETAIN_METADATA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionPreferences {
    /// Whether to log every substituted reference at debug level
    pub log_resolution_details: bool,

    /// Whether to log when a higher layer replaces a lower layer's token
    pub report_cascade_overrides: bool,

    /// Whether to warn when a variant override introduces a path the base lacks
    pub warn_on_new_override_paths: bool,
}

impl Default for ResolutionPreferences {
    fn default() -> Self {
        Self {
            log_resolution_details: env::var("DTK_RESOLUTION_LOG_DETAILS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            report_cascade_overrides: env::var("DTK_RESOLUTION_REPORT_CASCADE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            warn_on_new_override_paths: env::var("DTK_RESOLUTION_WARN_NEW_OVERRIDE_PATHS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterPreferences {
    /// Prepended to every custom property name (`--{prefix}-{name}`)
    pub custom_property_prefix: String,

    /// Attribute carrying the theme mode on the document root
    pub theme_attribute: String,

    /// Attribute carrying the density level on the document root
    pub density_attribute: String,

    /// Whether to start the stylesheet with a generated-file banner
    pub include_header_comment: bool,
}

impl Default for EmitterPreferences {
    fn default() -> Self {
        use super::constants::selectors;

        Self {
            custom_property_prefix: env::var("DTK_EMITTER_PREFIX").unwrap_or_default(),
            theme_attribute: env::var("DTK_EMITTER_THEME_ATTRIBUTE")
                .unwrap_or_else(|_| selectors::THEME_ATTRIBUTE.to_string()),
            density_attribute: env::var("DTK_EMITTER_DENSITY_ATTRIBUTE")
                .unwrap_or_else(|_| selectors::DENSITY_ATTRIBUTE.to_string()),
            include_header_comment: env::var("DTK_EMITTER_HEADER_COMMENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include the source document in log messages
    pub include_source_context: bool,

    /// Append events to this file as well
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("DTK_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("DTK_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("DTK_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("DTK_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var("DTK_LOGGING_CARGO_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_source_context: env::var("DTK_LOGGING_INCLUDE_SOURCE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_file: env::var_os("DTK_LOGGING_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub store: StorePreferences,
    pub resolution: ResolutionPreferences,
    pub emitter: EmitterPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Store
    pub const STORE_PERFORMANCE_LOGGING: &str = "DTK_STORE_PERFORMANCE_LOGGING";
    pub const STORE_RETAIN_METADATA: &str = "DTK_STORE_RETAIN_METADATA";

    // Resolution
    pub const RESOLUTION_LOG_DETAILS: &str = "DTK_RESOLUTION_LOG_DETAILS";
    pub const RESOLUTION_REPORT_CASCADE: &str = "DTK_RESOLUTION_REPORT_CASCADE";
    pub const RESOLUTION_WARN_NEW_OVERRIDE_PATHS: &str = "DTK_RESOLUTION_WARN_NEW_OVERRIDE_PATHS";

    // Emitter
    pub const EMITTER_PREFIX: &str = "DTK_EMITTER_PREFIX";
    pub const EMITTER_THEME_ATTRIBUTE: &str = "DTK_EMITTER_THEME_ATTRIBUTE";
    pub const EMITTER_DENSITY_ATTRIBUTE: &str = "DTK_EMITTER_DENSITY_ATTRIBUTE";
    pub const EMITTER_HEADER_COMMENT: &str = "DTK_EMITTER_HEADER_COMMENT";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "DTK_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "DTK_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "DTK_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "DTK_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "DTK_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "DTK_LOGGING_INCLUDE_SOURCE_CONTEXT";
    pub const LOGGING_FILE: &str = "DTK_LOGGING_FILE";
}
