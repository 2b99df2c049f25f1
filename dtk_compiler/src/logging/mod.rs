//! Pipeline logging
//!
//! Stages log through the macros in `macros.rs`. Events are stamped with the
//! document the current thread is processing, kept per document by a global
//! `ErrorCollector` for the end-of-run summary, and written by the global
//! `LoggingService`. Nothing is written until `init_global_logging` runs;
//! `capture_events` observes events either way.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::log_success;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary, SourceContext, PIPELINE_SOURCE};
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, EventSummary, Fanout, FileLogger, LineFormat, Logger, LoggingService, MemoryLogger,
};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
    static CAPTURE: RefCell<Option<Arc<MemoryLogger>>> = const { RefCell::new(None) };
}

/// Codes every stage reports through; init fails if any lacks metadata
const REQUIRED_CODES: [Code; 5] = [
    codes::system::INTERNAL_ERROR,
    codes::store::SOURCE_UNAVAILABLE,
    codes::references::CYCLIC_REFERENCE,
    codes::emitter::STYLESHEET_TOO_LARGE,
    codes::docs::MANIFEST_UNAVAILABLE,
];

/// Install the global service and collector from the active preferences
pub fn init_global_logging() -> Result<(), String> {
    config::LIMITS
        .validate()
        .map_err(|e| format!("Invalid logging limits: {}", e))?;

    if let Some(code) = REQUIRED_CODES.iter().find(|code| code.metadata().is_none()) {
        return Err(format!("Missing metadata for error code: {}", code));
    }

    GLOBAL_LOGGER
        .set(LoggingService::from_preferences(config::preferences()))
        .map_err(|_| "Global logger already initialized".to_string())?;
    GLOBAL_ERROR_COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "Global error collector already initialized".to_string())?;

    log_success!(codes::success::SYSTEM_INITIALIZATION_COMPLETED, "Logging initialized",
        "min_level" => config::preferences().min_log_level);
    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

/// Set the document for the current thread, returning the previous one
pub fn set_source_context(source: impl Into<String>, source_id: usize) -> Option<SourceContext> {
    let context = SourceContext::new(source, source_id);
    if let Some(collector) = try_get_global_error_collector() {
        collector.record_source_context(context.clone());
    }
    SOURCE_CONTEXT.with(|ctx| ctx.borrow_mut().replace(context))
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow_mut().take());
}

/// Run `f` with `source` attached to every event it logs; nests
pub fn with_source_context<F, R>(source: impl Into<String>, source_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = set_source_context(source, source_id);
    let result = f();
    SOURCE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Run `f` with every event it logs on this thread also kept in a fresh
/// `MemoryLogger`, whether or not global logging is initialized
pub fn capture_events<F, R>(f: F) -> (R, Arc<MemoryLogger>)
where
    F: FnOnce() -> R,
{
    let logger = Arc::new(MemoryLogger::new());
    let previous = CAPTURE.with(|capture| capture.borrow_mut().replace(logger.clone()));
    let result = f();
    CAPTURE.with(|capture| *capture.borrow_mut() = previous);
    (result, logger)
}

/// Finish an event built by a macro and route it
pub fn emit(mut event: LogEvent, fields: Vec<(&str, String)>) {
    let max_len = config::LIMITS.message_length;
    if event.message.len() > max_len {
        let mut cut = max_len;
        while !event.message.is_char_boundary(cut) {
            cut -= 1;
        }
        event.message.truncate(cut);
    }

    for (key, value) in fields {
        event.fields.insert(key.to_string(), value);
    }

    let context = get_current_source_context();
    if config::preferences().include_source_context {
        if let Some(context) = &context {
            event.document = Some(context.source.clone());
        }
    }

    if event.is_error() || event.is_warning() {
        if let Some(collector) = try_get_global_error_collector() {
            let source = context.map_or_else(|| PIPELINE_SOURCE.to_string(), |c| c.source);
            collector.record_event(&source, event.clone());
        }
    }

    CAPTURE.with(|capture| {
        if let Some(memory) = capture.borrow().as_ref() {
            memory.log(&event);
        }
    });

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Used by `log_error!`
pub fn emit_error(code: Code, message: impl Into<String>, token_path: Option<String>, fields: Vec<(&str, String)>) {
    let mut event = LogEvent::error(code, message);
    event.token_path = token_path;
    emit(event, fields);
}

/// Used by `log_warning!`
pub fn emit_warning(code: Option<Code>, message: impl Into<String>, fields: Vec<(&str, String)>) {
    let mut event = LogEvent::warning(message);
    if let Some(code) = code {
        event = event.with_code(code);
    }
    emit(event, fields);
}

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(ErrorCollector::get_summary)
        .unwrap_or_default()
}

/// Collected errors and warnings to stderr, cargo-style
pub fn print_cargo_style_summary() {
    if !config::preferences().enable_cargo_style_output {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector::format_cargo_style_errors(collector);
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}

/// Logging state for `dtk info`
pub fn get_system_diagnostics() -> String {
    let mut lines = vec![format!("logging initialized: {}", is_initialized())];

    if let Some(collector) = try_get_global_error_collector() {
        let (current, max, fraction) = collector.get_capacity_info();
        let summary = collector.get_summary();
        lines.push(format!("collected events: {}/{} ({:.1}%)", current, max, fraction * 100.0));
        lines.push(format!(
            "documents: {} ({} errors, {} warnings)",
            summary.total_sources, summary.total_errors, summary.total_warnings
        ));
    }

    lines.push(config::describe());
    lines.join("\n")
}
