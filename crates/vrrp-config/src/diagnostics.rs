//! Diagnostics produced while building a configuration.
//!
//! Every recoverable or structural problem is both logged through `tracing`
//! and kept on the build result, so callers can report them after the fact.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One diagnostic line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Name of the instance, group or script concerned, if any
    pub entity: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "{} ({}): {}", self.severity, entity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational diagnostic
    pub fn info(&mut self, entity: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Info, entity, message.into());
    }

    /// Record an error diagnostic
    pub fn error(&mut self, entity: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Error, entity, message.into());
    }

    fn push(&mut self, severity: Severity, entity: Option<&str>, message: String) {
        match (severity, entity) {
            (Severity::Info, Some(name)) => info!(entity = %name, "{message}"),
            (Severity::Info, None) => info!("{message}"),
            (Severity::Error, Some(name)) => error!(entity = %name, "{message}"),
            (Severity::Error, None) => error!("{message}"),
        }

        self.entries.push(Diagnostic {
            severity,
            entity: entity.map(str::to_owned),
            message,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics attached to `entity`
    pub fn for_entity<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries
            .iter()
            .filter(move |d| d.entity.as_deref() == Some(entity))
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
