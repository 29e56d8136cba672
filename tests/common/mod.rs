//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bundle_mover::fs_ops::{RenameRelocator, Relocator};
use bundle_mover::{Clock, Config, Diagnostic, DiagnosticSink, Scheduler, build_scheduler};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tempfile::TempDir;

/// Sink that keeps every entry for later inspection.
#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<Diagnostic>>>);

impl RecordingSink {
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.0.lock().unwrap().clone()
    }

    pub fn with_id(&self, id: u32) -> Vec<Diagnostic> {
        self.entries().into_iter().filter(|e| e.id == id).collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn write(&mut self, entry: &Diagnostic) {
        self.0.lock().unwrap().push(entry.clone());
    }
}

/// Clock the test moves by hand.
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 5, 2, 7, 30, 0).unwrap(),
        )))
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Relocator that performs real renames until it reaches the call numbered
/// `fail_at` (0-based), which fails with PermissionDenied. Later calls also fail.
#[derive(Clone)]
pub struct FailingRelocator {
    fail_at: usize,
    calls: Arc<AtomicUsize>,
}

impl FailingRelocator {
    pub fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Relocator for FailingRelocator {
    fn relocate(&self, src: &Path, dest: &Path) -> io::Result<()> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.fail_at {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated failure"));
        }
        RenameRelocator.relocate(src, dest)
    }
}

/// Inbox and two destinations under one temp root (canonical paths).
pub struct Layout {
    _td: TempDir,
    pub inbox: PathBuf,
    pub xml: PathBuf,
    pub att: PathBuf,
}

impl Layout {
    pub fn new() -> Self {
        let td = tempfile::tempdir().expect("tempdir");
        let base = fs::canonicalize(td.path()).expect("canonicalize tempdir");
        let inbox = base.join("inbox");
        let xml = base.join("xml");
        let att = base.join("att");
        for d in [&inbox, &xml, &att] {
            fs::create_dir_all(d).expect("create dir");
        }
        Self { _td: td, inbox, xml, att }
    }

    pub fn config(&self) -> Config {
        Config::new(&self.inbox, &self.xml, &self.att)
    }

    /// Write a manifest listing `attachments` at `inbox/<rel>`.
    pub fn manifest(&self, rel: &str, attachments: &[&str]) -> PathBuf {
        let path = self.inbox.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, manifest_xml(attachments)).unwrap();
        path
    }

    /// Write an arbitrary file at `inbox/<rel>`.
    pub fn file(&self, rel: &str, body: &str) -> PathBuf {
        let path = self.inbox.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    /// Scheduler wired to a recording sink; no waiting between passes.
    pub fn scheduler(&self) -> (Scheduler, RecordingSink) {
        let sink = RecordingSink::default();
        let mut cfg = self.config();
        let scheduler = build_scheduler(&mut cfg, Box::new(sink.clone()))
            .expect("valid config")
            .with_poll_interval(std::time::Duration::from_millis(20));
        (scheduler, sink)
    }
}

pub fn manifest_xml(attachments: &[&str]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<arende>\n  <rubrik>Test</rubrik>\n");
    for name in attachments {
        xml.push_str(&format!(
            "  <bifogadfil>\n    <filnamn>{name}</filnamn>\n  </bifogadfil>\n"
        ));
    }
    xml.push_str("</arende>\n");
    xml
}
