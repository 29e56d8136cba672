//! Deduplicated diagnostics.
//!
//! Every problem is reported once per (id, target) for the life of the
//! process; repeats on later passes are dropped before reaching the sink.
//! The set of seen keys is never pruned, so it grows with the number of
//! distinct failing paths.

use std::collections::HashSet;
use std::fmt;
use tracing::{error, info, warn};

use crate::errors::BundleError;

/// Diagnostic id for lifecycle events, configuration problems and fatal faults.
pub const LIFECYCLE_ID: u32 = 0;
/// Diagnostic id for an expired retry window.
pub const RETRY_EXPIRED_ID: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Ids below 20 are errors, the rest warnings.
    pub fn from_id(id: u32) -> Self {
        if id < 20 { Severity::Error } else { Severity::Warning }
    }
}

/// One entry handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: u32,
    pub severity: Severity,
    pub message: String,
    pub target: String,
    pub cause: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.target.is_empty() {
            write!(f, "\n\nTarget: {}", self.target)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "\n\n{cause}")?;
        }
        Ok(())
    }
}

/// Where diagnostics end up.
pub trait DiagnosticSink: Send {
    fn write(&mut self, entry: &Diagnostic);
}

/// Sink that turns diagnostics into tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write(&mut self, entry: &Diagnostic) {
        let cause = entry.cause.as_deref().unwrap_or("");
        match entry.severity {
            Severity::Error => {
                error!(id = entry.id, target_path = %entry.target, cause, "{}", entry.message)
            }
            Severity::Warning => {
                warn!(id = entry.id, target_path = %entry.target, cause, "{}", entry.message)
            }
            Severity::Info => info!(id = entry.id, "{}", entry.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DiagnosticKey {
    id: u32,
    target: String,
}

/// Suppresses repeated (id, target) diagnostics before they reach the sink.
pub struct DedupDiagnostics {
    sink: Box<dyn DiagnosticSink>,
    seen: HashSet<DiagnosticKey>,
}

impl DedupDiagnostics {
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            seen: HashSet::new(),
        }
    }

    /// Forward a diagnostic unless this (id, target) was already reported.
    /// Returns true when it reached the sink.
    pub fn emit(&mut self, message: &str, target: &str, id: u32, cause: Option<String>) -> bool {
        let key = DiagnosticKey {
            id,
            target: target.to_string(),
        };
        if !self.seen.insert(key) {
            return false;
        }
        self.sink.write(&Diagnostic {
            id,
            severity: Severity::from_id(id),
            message: message.to_string(),
            target: target.to_string(),
            cause,
        });
        true
    }

    /// Report a bundle error under its own id and target.
    pub fn emit_error(&mut self, err: &BundleError) -> bool {
        let target = err.target().display().to_string();
        self.emit(err.summary(), &target, err.diagnostic_id(), err.cause())
    }

    /// Service transitions ("started", "stopped") are informational and never deduplicated.
    pub fn lifecycle(&mut self, message: &str) {
        self.sink.write(&Diagnostic {
            id: LIFECYCLE_ID,
            severity: Severity::Info,
            message: message.to_string(),
            target: String::new(),
            cause: None,
        });
    }

    /// Number of distinct keys reported so far.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }
}

impl fmt::Debug for DedupDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedupDiagnostics")
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<Diagnostic>>>);

    impl DiagnosticSink for Recording {
        fn write(&mut self, entry: &Diagnostic) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    #[test]
    fn same_id_and_target_reported_once() {
        let rec = Recording::default();
        let mut d = DedupDiagnostics::new(Box::new(rec.clone()));
        assert!(d.emit("File does not exist", "/in/a.pdf", 10, None));
        assert!(!d.emit("File does not exist", "/in/a.pdf", 10, None));
        assert!(!d.emit("different text, same key", "/in/a.pdf", 10, None));
        assert!(d.emit("File does not exist", "/in/b.pdf", 10, None));
        assert!(d.emit("Failed to move file", "/in/a.pdf", 11, None));
        assert_eq!(rec.0.lock().unwrap().len(), 3);
        assert_eq!(d.seen_len(), 3);
    }

    #[test]
    fn severity_comes_from_id() {
        let rec = Recording::default();
        let mut d = DedupDiagnostics::new(Box::new(rec.clone()));
        d.emit("a", "t", 19, None);
        d.emit("b", "t", 20, None);
        d.emit("c", "t", 22, None);
        let got: Vec<_> = rec.0.lock().unwrap().iter().map(|e| e.severity).collect();
        assert_eq!(got, vec![Severity::Error, Severity::Warning, Severity::Warning]);
    }

    #[test]
    fn lifecycle_is_not_deduplicated() {
        let rec = Recording::default();
        let mut d = DedupDiagnostics::new(Box::new(rec.clone()));
        d.lifecycle("Service started.");
        d.lifecycle("Service started.");
        assert_eq!(rec.0.lock().unwrap().len(), 2);
        assert_eq!(d.seen_len(), 0);
    }

    #[test]
    fn bundle_error_uses_its_target() {
        let rec = Recording::default();
        let mut d = DedupDiagnostics::new(Box::new(rec.clone()));
        let e = BundleError::DestinationCollision(PathBuf::from("/out/a.pdf"));
        assert!(d.emit_error(&e));
        assert!(!d.emit_error(&e));
        let entry = rec.0.lock().unwrap()[0].clone();
        assert_eq!(entry.target, "/out/a.pdf");
        assert_eq!(entry.to_string(), "File already exists\n\nTarget: /out/a.pdf");
    }
}
