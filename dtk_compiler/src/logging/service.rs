//! Logger sinks and the level-filtering service in front of them

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// How a sink renders one event per line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    Text,
    Json,
}

impl LineFormat {
    fn from_preferences(preferences: &LoggingPreferences) -> Self {
        if preferences.use_structured_logging {
            LineFormat::Json
        } else {
            LineFormat::Text
        }
    }

    pub fn render(self, event: &LogEvent) -> String {
        match self {
            LineFormat::Json => event.to_json().unwrap_or_else(|_| event.to_string()),
            LineFormat::Text if event.is_error() => event.detailed(),
            LineFormat::Text => match &event.document {
                Some(document) => format!("{} ({})", event, document),
                None => event.to_string(),
            },
        }
    }
}

/// Drops events below the minimum level, passes the rest to one logger
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Console and file sinks as the preferences enable them
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let format = LineFormat::from_preferences(preferences);
        let mut sinks = Fanout::new();

        if preferences.enable_console_logging {
            sinks.add(Arc::new(ConsoleLogger::new(format)));
        }

        if let Some(path) = &preferences.log_file {
            match FileLogger::open(path, format) {
                Ok(file) => sinks.add(Arc::new(file)),
                Err(e) => eprintln!("Cannot open log file '{}': {}", path.display(), e),
            }
        }

        Self::new(Arc::new(sinks), preferences.min_log_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if event.level <= self.min_level {
            self.logger.log(&event);
        }
    }
}

/// Errors and warnings to stderr, everything else to stdout
pub struct ConsoleLogger {
    format: LineFormat,
}

impl ConsoleLogger {
    pub fn new(format: LineFormat) -> Self {
        Self { format }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.format.render(event);
        if event.is_error() || event.is_warning() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Appends one line per event to a file kept open for the process
pub struct FileLogger {
    file: Mutex<File>,
    format: LineFormat,
}

impl FileLogger {
    pub fn open(path: &Path, format: LineFormat) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            format,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.format.render(event);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        // A failed write cannot itself be logged
        let _ = writeln!(file, "{}", line);
    }
}

/// Sends each event to every registered logger
#[derive(Default)]
pub struct Fanout {
    loggers: Vec<Arc<dyn Logger>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for Fanout {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

/// Keeps the most recent events in memory, up to the profile's buffer size.
/// Backs `capture_events`.
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn matching(&self, keep: impl Fn(&LogEvent) -> bool) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| keep(e)).cloned().collect()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn errors(&self) -> Vec<LogEvent> {
        self.matching(LogEvent::is_error)
    }

    pub fn warnings(&self) -> Vec<LogEvent> {
        self.matching(LogEvent::is_warning)
    }

    /// Events of any level carrying `code`
    pub fn with_code(&self, code: Code) -> Vec<LogEvent> {
        self.matching(|e| e.code == code)
    }

    /// Events raised at one token path
    pub fn at_path(&self, token_path: &str) -> Vec<LogEvent> {
        self.matching(|e| e.token_path.as_deref() == Some(token_path))
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_warning_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_warning() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn in_category(&self, category: &str) -> Vec<LogEvent> {
        self.matching(|e| e.category() == category)
    }

    pub fn summary(&self) -> EventSummary {
        let mut summary = EventSummary::default();
        for event in self.lock().iter() {
            summary.total_count += 1;
            match event.level {
                LogLevel::Error => summary.error_count += 1,
                LogLevel::Warning => summary.warning_count += 1,
                LogLevel::Info => summary.info_count += 1,
                LogLevel::Debug => summary.debug_count += 1,
            }
            if event.is_halting() {
                summary.halting_count += 1;
            }
        }
        summary
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        let capacity = config::LIMITS.buffered_events;
        if events.len() >= capacity {
            let overflow = events.len() + 1 - capacity;
            events.drain(..overflow);
        }
        events.push(event.clone());
    }
}

/// Counts per level over a `MemoryLogger`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    pub halting_count: usize,
}

impl EventSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Any error whose code stops the build
    pub fn has_halting_errors(&self) -> bool {
        self.halting_count > 0
    }
}
