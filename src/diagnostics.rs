// ABOUTME: Diagnostics channel for the pptreport application
// ABOUTME: Collects non-fatal warnings raised during resolution and layout

use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A pattern matched zero files and the missing-file policy recovered.
    NoMatch,
    /// A regular expression failed to compile and was kept as literal text.
    InvalidPattern,
    /// A group pattern matched the same key more than once.
    DuplicateKey,
    /// A custom layout matrix references more boxes than there is content.
    UnusedCell,
    /// A content item could not be rendered as intended.
    Content,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub pattern: Option<String>,
    pub message: String,
}

/// Warnings are recorded here and mirrored to the `log` facade, so callers can
/// inspect them without capturing process output.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, pattern: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.warnings.push(Warning {
            kind,
            pattern: pattern.map(str::to_string),
            message,
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}
