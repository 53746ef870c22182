//! Shared test helpers: a logger sink that records every line.

use courier_core::retry::{ErrorContext, RetryLogger};
use std::error::Error as StdError;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: ErrorContext,
    pub cause: Option<String>,
}

#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<Record>>,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn at(&self, level: Level) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }

    /// `delayMs` of every "waiting before retry" line, in order.
    pub fn delays_ms(&self) -> Vec<u64> {
        self.at(Level::Debug)
            .iter()
            .filter_map(|r| r.fields.get("delayMs").and_then(|v| v.as_u64()))
            .collect()
    }

    fn push(&self, level: Level, message: &str, fields: &ErrorContext, cause: Option<String>) {
        self.records.lock().unwrap().push(Record {
            level,
            message: message.to_string(),
            fields: fields.clone(),
            cause,
        });
    }
}

impl RetryLogger for RecordingLogger {
    fn debug(&self, message: &str, fields: &ErrorContext) {
        self.push(Level::Debug, message, fields, None);
    }

    fn info(&self, message: &str, fields: &ErrorContext) {
        self.push(Level::Info, message, fields, None);
    }

    fn warn(&self, message: &str, fields: &ErrorContext, cause: Option<&(dyn StdError + 'static)>) {
        self.push(Level::Warn, message, fields, cause.map(|c| c.to_string()));
    }

    fn error(&self, message: &str, fields: &ErrorContext, cause: Option<&(dyn StdError + 'static)>) {
        self.push(Level::Error, message, fields, cause.map(|c| c.to_string()));
    }
}
