//! Error collector with cargo-style output
//!
//! Groups errors and warnings by the source document that produced them so a
//! failed build can be reported per layer or override file.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Key used for events raised outside any source context
pub const PIPELINE_SOURCE: &str = "(pipeline)";

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The document currently being processed on this thread
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub source: String,
    pub source_id: usize,
}

impl SourceContext {
    pub fn new(source: impl Into<String>, source_id: usize) -> Self {
        Self {
            source: source.into(),
            source_id,
        }
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_sources: usize,
    pub clean_sources: usize,
    pub failed_sources: usize,
    pub sources_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe collector of error and warning events
pub struct ErrorCollector {
    source_events: Mutex<BTreeMap<String, Vec<LogEvent>>>,
    source_contexts: Mutex<BTreeMap<String, SourceContext>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            source_events: Mutex::new(BTreeMap::new()),
            source_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<String, Vec<LogEvent>>> {
        self.source_events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn contexts(&self) -> MutexGuard<'_, BTreeMap<String, SourceContext>> {
        self.source_contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an event for a source; per-source and global limits apply
    pub fn record_event(&self, source: &str, event: LogEvent) {
        let mut events = self.events();

        let total: usize = events.values().map(Vec::len).sum();
        if total >= MAX_ERROR_COLLECTION {
            return;
        }

        let source_events = events.entry(source.to_string()).or_default();

        if source_events.len() < MAX_LOG_EVENTS_PER_SOURCE {
            source_events.push(event);
        } else if source_events.len() == MAX_LOG_EVENTS_PER_SOURCE {
            source_events.push(LogEvent::warning(&format!(
                "Too many events for source (limit: {})",
                MAX_LOG_EVENTS_PER_SOURCE
            )));
        }
    }

    pub fn record_source_context(&self, context: SourceContext) {
        self.contexts().insert(context.source.clone(), context);
    }

    pub fn get_source_events(&self, source: &str) -> Vec<LogEvent> {
        self.events().get(source).cloned().unwrap_or_default()
    }

    pub fn get_all_source_events(&self) -> BTreeMap<String, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn source_has_errors(&self, source: &str) -> bool {
        self.events()
            .get(source)
            .map(|events| events.iter().any(|e| e.is_error()))
            .unwrap_or(false)
    }

    /// Counts over every source seen, including documents that logged nothing
    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();
        let quiet_sources = self
            .contexts()
            .keys()
            .filter(|source| !events.contains_key(*source))
            .count();

        let mut summary = ProcessingSummary {
            total_sources: events.len() + quiet_sources,
            clean_sources: quiet_sources,
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for source_events in events.values() {
            let errors = source_events.iter().filter(|e| e.is_error()).count();
            let warnings = source_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_sources += 1;
            } else if warnings > 0 {
                summary.sources_with_warnings += 1;
            } else {
                summary.clean_sources += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    /// Errors that require halting, with their source
    pub fn get_critical_errors(&self) -> Vec<(String, LogEvent)> {
        self.events()
            .iter()
            .flat_map(|(source, events)| {
                events
                    .iter()
                    .filter(|e| e.is_halting())
                    .map(move |e| (source.clone(), e.clone()))
            })
            .collect()
    }

    pub fn total_event_count(&self) -> usize {
        self.events().values().map(Vec::len).sum()
    }

    /// (current, max, fraction) against the collection limit
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = MAX_ERROR_COLLECTION;
        let fraction = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, fraction)
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn push_event(output: &mut String, label: &str, source: &str, event: &LogEvent) {
    output.push_str(&format!("{}[{}]: {}\n", label, event.code, event.message));
    if let Some(path) = &event.token_path {
        output.push_str(&format!("  --> {}: {}\n", source, path));
    }
    for (key, value) in &event.fields {
        output.push_str(&format!("  = {}: {}\n", key, value));
    }
}

/// Errors then warnings per document, followed by totals
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (source, events) in &collector.get_all_source_events() {
        if events.is_empty() {
            continue;
        }
        output.push_str(&format!("Checking {}...\n", source));

        for event in events.iter().filter(|e| e.is_error()) {
            push_event(&mut output, "error", source, event);
            if let Some(metadata) = event.metadata() {
                output.push_str(&format!(
                    "  = {} ({}): {}\n",
                    metadata.category,
                    metadata.severity.as_str(),
                    metadata.description
                ));
                output.push_str(&format!("  = help: {}\n", metadata.recommended_action));
            }
        }
        for event in events.iter().filter(|e| e.is_warning()) {
            push_event(&mut output, "warning", source, event);
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.has_errors() {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.has_warnings() {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();

        collector.record_event(
            "tokens/semantic.json",
            LogEvent::error(codes::references::UNRESOLVED_REFERENCE, "Missing target"),
        );

        assert_eq!(collector.get_source_events("tokens/semantic.json").len(), 1);
        assert!(collector.source_has_errors("tokens/semantic.json"));
        assert!(!collector.source_has_errors("tokens/primitive.json"));
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();

        collector.record_event(
            "primitive.json",
            LogEvent::error(codes::store::MALFORMED_DOCUMENT, "Error"),
        );
        collector.record_event("docs/manifest", LogEvent::warning("Warning"));

        collector.record_source_context(SourceContext::new("primitive.json", 1));
        collector.record_source_context(SourceContext::new("component.json", 2));

        let summary = collector.get_summary();
        assert_eq!(summary.total_sources, 3);
        assert_eq!(summary.clean_sources, 1);
        assert_eq!(summary.failed_sources, 1);
        assert_eq!(summary.sources_with_warnings, 1);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.total_warnings, 1);
        assert!(summary.has_errors());
        assert!(summary.has_warnings());
    }

    #[test]
    fn test_per_source_limit_appends_one_marker() {
        let collector = ErrorCollector::new();

        for i in 0..MAX_LOG_EVENTS_PER_SOURCE + 5 {
            collector.record_event("noisy.json", LogEvent::warning(&format!("w{}", i)));
        }

        let events = collector.get_source_events("noisy.json");
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_SOURCE + 1);
        assert!(events
            .last()
            .map(|e| e.message.starts_with("Too many events"))
            .unwrap_or(false));
    }

    #[test]
    fn test_critical_errors() {
        let collector = ErrorCollector::new();

        collector.record_event(
            PIPELINE_SOURCE,
            LogEvent::error(codes::system::INTERNAL_ERROR, "Critical error"),
        );
        collector.record_event(
            PIPELINE_SOURCE,
            LogEvent::warning("No manifest").with_code(codes::docs::MANIFEST_UNAVAILABLE),
        );

        let critical = collector.get_critical_errors();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].1.code.as_str(), "ERR001");
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();

        collector.record_event(
            "tokens/semantic.json",
            LogEvent::error(codes::references::CYCLIC_REFERENCE, "Cyclic reference")
                .at("color.a")
                .with_field("cycle", "color.a -> color.b -> color.a"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking tokens/semantic.json..."));
        assert!(output.contains("error[E023]: Cyclic reference\n  --> tokens/semantic.json: color.a\n"));
        assert!(output.contains("  = cycle: color.a -> color.b -> color.a"));
        assert!(output.contains("  = help: "));
        assert!(output.contains("Total errors: 1"));
    }
}
