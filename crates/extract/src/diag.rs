//! Structured, best-effort diagnostics.
//!
//! The extractor never fails outright: every recoverable anomaly becomes a
//! [`Diagnostic`] carrying enough context to locate the packet, and the run
//! continues. Records are mirrored to the `log` facade so a plain log
//! subscriber sees them too.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One anomaly observed while lifting the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The packet being extracted when the anomaly surfaced, if any.
    pub packet: Option<String>,
    pub message: String,
}

/// Collects diagnostics for one extraction run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    packet: Option<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Sets the packet name prefixed to subsequent records.
    pub fn set_packet(&mut self, packet: Option<String>) {
        self.packet = packet;
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    fn push(&mut self, severity: Severity, message: String) {
        match (&severity, &self.packet) {
            (Severity::Warning, Some(p)) => log::warn!("[{p}] {message}"),
            (Severity::Warning, None) => log::warn!("{message}"),
            (Severity::Error, Some(p)) => log::error!("[{p}] {message}"),
            (Severity::Error, None) => log::error!("{message}"),
        }
        self.records.push(Diagnostic {
            severity,
            packet: self.packet.clone(),
            message,
        });
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }

    pub fn warning_count(&self) -> usize {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}
