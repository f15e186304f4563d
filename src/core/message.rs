use serde::{Deserialize, Serialize};

/// Severity of an export message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Advisory, e.g. a completion message with counts.
    Info,
    /// Something was skipped or coerced; the export still succeeded.
    Warning,
    /// A fatal failure, recorded by the calling driver.
    Error,
}

/// A severity-tagged message produced during an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMessage {
    /// Message severity.
    pub severity: Severity,
    /// Human-readable text.
    pub text: String,
}

impl std::fmt::Display for ExportMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

/// Collector for export messages — the sink the report providers write
/// warnings and completion advisories into.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    entries: Vec<ExportMessage>,
}

impl Messages {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an advisory message.
    pub fn info(&mut self, text: impl Into<String>) {
        self.entries.push(ExportMessage {
            severity: Severity::Info,
            text: text.into(),
        });
    }

    /// Record a non-fatal warning.
    pub fn warning(&mut self, text: impl Into<String>) {
        self.entries.push(ExportMessage {
            severity: Severity::Warning,
            text: text.into(),
        });
    }

    /// Record a fatal failure for the surrounding driver.
    pub fn error(&mut self, text: impl Into<String>) {
        self.entries.push(ExportMessage {
            severity: Severity::Error,
            text: text.into(),
        });
    }

    /// All recorded messages, in order.
    pub fn entries(&self) -> &[ExportMessage] {
        &self.entries
    }

    /// Only the warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &ExportMessage> {
        self.entries
            .iter()
            .filter(|m| m.severity == Severity::Warning)
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
