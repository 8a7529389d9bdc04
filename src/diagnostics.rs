//! Diagnostic sinks
//!
//! `LogSink` forwards to the `log` facade; `RecordingSink` keeps everything in
//! memory so callers can inspect what a run reported.

use crate::common::traits::{DiagnosticLevel, DiagnosticSink};
use std::fmt;

/// Log target used for verifier output
pub const LOG_TARGET: &str = "verify";

impl From<DiagnosticLevel> for log::Level {
    fn from(level: DiagnosticLevel) -> Self {
        match level {
            DiagnosticLevel::Debug => log::Level::Debug,
            DiagnosticLevel::Info => log::Level::Info,
            DiagnosticLevel::Warning => log::Level::Warn,
            DiagnosticLevel::Error => log::Level::Error,
        }
    }
}

/// Sends diagnostics to whatever logger the process installed
#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&mut self, level: DiagnosticLevel, message: fmt::Arguments<'_>) {
        let level: log::Level = level.into();
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}

/// A single captured diagnostic
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

/// Collects diagnostics in emission order
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    records: Vec<Diagnostic>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn at_level(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(move |d| d.level == level)
    }

    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.at_level(level).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, level: DiagnosticLevel, message: fmt::Arguments<'_>) {
        self.records.push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}
