//! Polling loop.
//!
//! One scheduler runs on one worker thread and owns all mutable state: the
//! failure table and the diagnostic dedup set. A pass scans the inbox and
//! handles each manifest in turn; between passes the worker sleeps. Stop
//! requests are honoured before every pass and before every bundle, never in
//! the middle of a file operation.

use anyhow::{Result, anyhow};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::bundle::{
    Attempt, Bundle, FailureTracker, MoveOptions, Routes, check_movable, execute_move,
    read_attachments, scan_manifests,
};
use crate::clock::{Clock, SystemClock};
use crate::config::Directories;
use crate::diagnostics::{DedupDiagnostics, LIFECYCLE_ID, RETRY_EXPIRED_ID};
use crate::fs_ops::{RenameRelocator, Relocator};
use crate::shutdown::StopFlag;

/// Pause between passes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

const RETRY_EXPIRED_MSG: &str =
    "Time limit exceeded for files in target folder. No more attempts will be made to move the files.";
const FAULT_MSG: &str = "An unhandled fault occurred. Service stopped.";

/// What happened to one manifest during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleOutcome {
    Moved,
    /// Known permanent failure, or an unusable manifest name.
    Skipped,
    /// Retry window ran out on this pass.
    Expired,
    Failed { permanent: bool },
}

/// Counters for one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub manifests: usize,
    pub moved: usize,
    pub failed: usize,
    pub skipped: usize,
    /// True when a stop request cut the pass short.
    pub interrupted: bool,
}

pub struct Scheduler {
    inbox: std::path::PathBuf,
    routes: Routes,
    reset_permissions: bool,
    tracker: FailureTracker,
    diagnostics: DedupDiagnostics,
    clock: Box<dyn Clock>,
    relocator: Box<dyn Relocator>,
    stop: StopFlag,
    poll_interval: Duration,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("inbox", &self.inbox)
            .field("routes", &self.routes)
            .field("reset_permissions", &self.reset_permissions)
            .field("tracker", &self.tracker)
            .field("stop", &self.stop)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn new(dirs: Directories, reset_permissions: bool, diagnostics: DedupDiagnostics) -> Self {
        Self {
            inbox: dirs.source,
            routes: Routes::new(dirs.xml_destination, dirs.attachment_destination),
            reset_permissions,
            tracker: FailureTracker::default(),
            diagnostics,
            clock: Box::new(SystemClock),
            relocator: Box::new(RenameRelocator),
            stop: StopFlag::new(),
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_relocator(mut self, relocator: Box<dyn Relocator>) -> Self {
        self.relocator = relocator;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_tracker(mut self, tracker: FailureTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Handle for requesting a stop from another thread.
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn tracker(&self) -> &FailureTracker {
        &self.tracker
    }

    pub fn diagnostics(&self) -> &DedupDiagnostics {
        &self.diagnostics
    }

    /// Loop until stopped. An error or panic escaping a pass is reported as
    /// fatal and ends the loop; it is returned to the caller.
    pub fn run(&mut self) -> Result<()> {
        self.diagnostics.lifecycle("Service started.");
        info!(inbox = %self.inbox.display(), "worker started");

        while !self.stop.is_requested() {
            let pass = panic::catch_unwind(AssertUnwindSafe(|| self.run_pass()))
                .unwrap_or_else(|payload| Err(anyhow!("panic during pass: {}", panic_text(&*payload))));
            match pass {
                Ok(summary) => debug!(?summary, "pass complete"),
                Err(e) => {
                    error!(error = ?e, "pass failed");
                    self.diagnostics
                        .emit(FAULT_MSG, "", LIFECYCLE_ID, Some(format!("{e:#}")));
                    return Err(e);
                }
            }
            if !self.stop.sleep(self.poll_interval) {
                break;
            }
        }

        self.diagnostics.lifecycle("Service stopped.");
        info!("worker stopped");
        Ok(())
    }

    /// Scan once and handle every manifest found.
    pub fn run_pass(&mut self) -> Result<PassSummary> {
        let manifests = scan_manifests(&self.inbox)?;
        let mut summary = PassSummary {
            manifests: manifests.len(),
            ..Default::default()
        };

        for manifest in &manifests {
            if self.stop.is_requested() {
                summary.interrupted = true;
                break;
            }
            match self.process_manifest(manifest) {
                BundleOutcome::Moved => summary.moved += 1,
                BundleOutcome::Failed { .. } => summary.failed += 1,
                BundleOutcome::Skipped | BundleOutcome::Expired => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    /// Take one manifest through read, resolve, check and move.
    pub fn process_manifest(&mut self, manifest: &Path) -> BundleOutcome {
        let (Some(key), Some(source_dir)) = (
            manifest.file_name().and_then(|n| n.to_str()),
            manifest.parent(),
        ) else {
            debug!(path = %manifest.display(), "unusable manifest path");
            return BundleOutcome::Skipped;
        };

        let now = self.clock.now();
        match self.tracker.should_attempt(key, now) {
            Attempt::Proceed => {}
            Attempt::Skip => return BundleOutcome::Skipped,
            Attempt::Expired => {
                self.diagnostics.emit(
                    RETRY_EXPIRED_MSG,
                    &source_dir.display().to_string(),
                    RETRY_EXPIRED_ID,
                    None,
                );
                return BundleOutcome::Expired;
            }
        }

        let attachments = match read_attachments(manifest) {
            Ok(a) => a,
            Err(e) => return self.fail(key, &e),
        };
        let bundle = Bundle::resolve(key, source_dir, attachments);

        if let Err(e) = check_movable(&bundle, &self.routes) {
            return self.fail(key, &e);
        }

        let opts = MoveOptions {
            reset_permissions: self.reset_permissions,
            inbox_root: &self.inbox,
        };
        match execute_move(&bundle, &self.routes, self.relocator.as_ref(), opts) {
            Ok(report) => {
                for warning in &report.warnings {
                    self.diagnostics.emit_error(warning);
                }
                self.tracker.clear(key);
                BundleOutcome::Moved
            }
            Err(e) => self.fail(key, &e),
        }
    }

    fn fail(&mut self, key: &str, err: &crate::errors::BundleError) -> BundleOutcome {
        let permanent = err.is_permanent();
        debug!(bundle = key, error = %err, permanent, "bundle attempt failed");
        self.diagnostics.emit_error(err);
        self.tracker.record_failure(key, permanent, self.clock.now());
        BundleOutcome::Failed { permanent }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
