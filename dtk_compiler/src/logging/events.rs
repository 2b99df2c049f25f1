//! Pipeline log events
//!
//! An event carries a registered code, the token path it concerns when there
//! is one, and the document that was being processed when it was raised.

use super::codes::{self, Code, ErrorMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Code for events raised without one
    fn uncoded(self) -> Code {
        match self {
            LogLevel::Error => codes::system::INTERNAL_ERROR,
            LogLevel::Warning => Code::new("W000"),
            LogLevel::Info => Code::new("I000"),
            LogLevel::Debug => Code::new("D000"),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}' (expected error, warn, info or debug)")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    /// Accepts names in any case and the numeric levels 0 to 3
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warning" | "warn" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Dotted token path, e.g. `color.text.primary`
    pub token_path: Option<String>,
    pub document: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code: level.uncoded(),
            message: message.into(),
            token_path: None,
            document: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message).with_code(code)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    /// Info event carrying a success code
    pub fn success(code: Code, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message).with_code(code)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn with_code(mut self, code: Code) -> Self {
        self.code = code;
        self
    }

    pub fn at(mut self, token_path: impl Into<String>) -> Self {
        self.token_path = Some(token_path.into());
        self
    }

    pub fn in_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    /// Registry entry for this event's code; generic `W000`-style codes have none
    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        codes::get_error_metadata(self.code.as_str())
    }

    /// An error whose code stops the build
    pub fn is_halting(&self) -> bool {
        self.is_error() && self.metadata().is_some_and(|m| m.requires_halt)
    }

    pub fn category(&self) -> &'static str {
        self.metadata().map_or("Unknown", |m| m.category)
    }

    /// Multi-line rendering with registry metadata and fields
    pub fn detailed(&self) -> String {
        let mut output = self.to_string();
        if let Some(document) = &self.document {
            output.push_str(&format!("\n  document: {}", document));
        }
        if let Some(metadata) = self.metadata() {
            output.push_str(&format!(
                "\n  {} / {}",
                metadata.category,
                metadata.severity.as_str()
            ));
            if self.is_error() {
                output.push_str(&format!(
                    "\n  recoverable: {}, halts build: {}",
                    metadata.recoverable, metadata.requires_halt
                ));
            }
            output.push_str(&format!("\n  {}", metadata.description));
            output.push_str(&format!("\n  help: {}", metadata.recommended_action));
        }
        for (key, value) in &self.fields {
            output.push_str(&format!("\n  {}: {}", key, value));
        }
        output
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&EventRecord::from(self))
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.level, self.code, self.message)?;
        if let Some(path) = &self.token_path {
            write!(f, " at {}", path)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EventRecord<'a> {
    timestamp: String,
    level: &'static str,
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    halts_build: Option<bool>,
    #[serde(skip_serializing_if = "no_fields")]
    fields: &'a BTreeMap<String, String>,
}

fn no_fields(fields: &&BTreeMap<String, String>) -> bool {
    fields.is_empty()
}

impl<'a> From<&'a LogEvent> for EventRecord<'a> {
    fn from(event: &'a LogEvent) -> Self {
        let metadata = event.metadata();
        Self {
            timestamp: event.timestamp.to_rfc3339(),
            level: event.level.as_str(),
            code: event.code.as_str(),
            message: &event.message,
            token_path: event.token_path.as_deref(),
            document: event.document.as_deref(),
            category: metadata.map(|m| m.category),
            halts_build: metadata.filter(|_| event.is_error()).map(|m| m.requires_halt),
            fields: &event.fields,
        }
    }
}
