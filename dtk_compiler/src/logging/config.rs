//! Active logging preferences and buffer limits
//!
//! Buffer limits come from the build profile. Preferences are installed once
//! (the CLI does this for `--verbose`); otherwise the `DTK_LOGGING_*`
//! environment defaults are read on first use.

use super::events::LogLevel;
use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::fmt;
use std::sync::OnceLock;

static ACTIVE: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install preferences; fails once anything has read or installed them
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    ACTIVE
        .set(preferences)
        .map_err(|_| "Logging preferences already in effect".to_string())
}

pub fn preferences() -> &'static LoggingPreferences {
    ACTIVE.get_or_init(LoggingPreferences::default)
}

/// Whether events at `level` pass the configured minimum
pub fn enabled(level: LogLevel) -> bool {
    level <= preferences().min_log_level
}

/// Compile-time bounds on what the logging layer keeps in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    pub buffered_events: usize,
    pub events_per_source: usize,
    pub message_length: usize,
    pub collected_events: usize,
}

pub const LIMITS: BufferLimits = BufferLimits {
    buffered_events: LOG_BUFFER_SIZE,
    events_per_source: MAX_LOG_EVENTS_PER_SOURCE,
    message_length: MAX_LOG_MESSAGE_LENGTH,
    collected_events: MAX_ERROR_COLLECTION,
};

impl BufferLimits {
    pub fn validate(&self) -> Result<(), String> {
        if !(100..=100_000).contains(&self.buffered_events) {
            return Err(format!(
                "log buffer must hold between 100 and 100000 events, got {}",
                self.buffered_events
            ));
        }
        if self.events_per_source > self.buffered_events {
            return Err(format!(
                "{} events per source exceeds the {} event buffer",
                self.events_per_source, self.buffered_events
            ));
        }
        if self.message_length == 0 {
            return Err("log message length limit must be positive".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for BufferLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "buffered events: {}", self.buffered_events)?;
        writeln!(f, "events per source: {}", self.events_per_source)?;
        writeln!(f, "message length: {}", self.message_length)?;
        write!(f, "collected events: {}", self.collected_events)
    }
}

/// Limits and active preferences, for `dtk info`
pub fn describe() -> String {
    let active = preferences();
    format!(
        "{}\nminimum level: {}\nstructured: {}\nconsole: {}\nperformance events: {}\ncargo-style summary: {}\nsource context: {}\nlog file: {}",
        LIMITS,
        active.min_log_level,
        active.use_structured_logging,
        active.enable_console_logging,
        active.log_performance_events,
        active.enable_cargo_style_output,
        active.include_source_context,
        active
            .log_file
            .as_ref()
            .map_or_else(|| "none".to_string(), |path| path.display().to_string()),
    )
}

/// Console output down to debug, with timings and document names
pub fn development() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: LogLevel::Debug,
        log_performance_events: true,
        enable_cargo_style_output: true,
        include_source_context: true,
        log_file: None,
    }
}

/// JSON lines at info and above, no console summary
pub fn ci() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: true,
        enable_console_logging: false,
        min_log_level: LogLevel::Info,
        log_performance_events: false,
        enable_cargo_style_output: false,
        include_source_context: false,
        log_file: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_limits_are_valid() {
        assert!(LIMITS.validate().is_ok());
    }

    #[test]
    fn test_limit_validation() {
        let tiny = BufferLimits { buffered_events: 10, ..LIMITS };
        assert!(tiny.validate().unwrap_err().contains("between 100 and 100000"));

        let lopsided = BufferLimits {
            buffered_events: 200,
            events_per_source: 500,
            ..LIMITS
        };
        assert!(lopsided.validate().unwrap_err().contains("exceeds"));

        let silent = BufferLimits { message_length: 0, ..LIMITS };
        assert!(silent.validate().is_err());
    }

    #[test]
    fn test_presets() {
        let dev = development();
        let ci = ci();

        assert!(!dev.use_structured_logging);
        assert!(ci.use_structured_logging);
        assert!(dev.min_log_level > ci.min_log_level);
        assert!(dev.include_source_context);
    }

    #[test]
    fn test_describe_lists_limits_and_preferences() {
        let text = describe();
        assert!(text.contains(&format!("buffered events: {}", LOG_BUFFER_SIZE)));
        assert!(text.contains("minimum level: "));
        assert!(text.contains("log file: "));
    }
}
