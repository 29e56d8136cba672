//! Service lifecycle: validate once, spawn the worker, stop it cooperatively.

use anyhow::{Context, Result, anyhow};
use std::thread::{self, JoinHandle};
use tracing::info;

use crate::config::{Config, validate_and_normalize};
use crate::diagnostics::{DedupDiagnostics, DiagnosticSink, LIFECYCLE_ID};
use crate::scheduler::Scheduler;
use crate::shutdown::StopFlag;

const INVALID_RESET_MSG: &str =
    "Invalid value for ResetPermissionsAfterMove. Valid values are \"true\" or \"false\"";

/// Handle to a running worker.
#[derive(Debug)]
pub struct MoverService {
    stop: StopFlag,
    worker: Option<JoinHandle<Result<()>>>,
}

/// Validate `cfg` and build a scheduler reporting to `sink`.
///
/// Directory problems are reported through the sink (id 0) and returned; an
/// invalid reset-permissions value is reported and treated as false.
pub fn build_scheduler(cfg: &mut Config, sink: Box<dyn DiagnosticSink>) -> Result<Scheduler> {
    let mut diagnostics = DedupDiagnostics::new(sink);
    let dirs = match validate_and_normalize(cfg) {
        Ok(dirs) => dirs,
        Err(e) => {
            diagnostics.emit(&e.to_string(), &e.target(), LIFECYCLE_ID, None);
            return Err(e.into());
        }
    };
    if let Some(raw) = cfg.invalid_reset_value.as_deref() {
        diagnostics.emit(INVALID_RESET_MSG, raw, LIFECYCLE_ID, None);
    }
    Ok(Scheduler::new(dirs, cfg.reset_permissions, diagnostics))
}

impl MoverService {
    /// Spawn `scheduler` on its own thread.
    pub fn start(scheduler: Scheduler) -> Result<Self> {
        let stop = scheduler.stop_flag();
        let mut scheduler = scheduler;
        let worker = thread::Builder::new()
            .name("bundle-mover".into())
            .spawn(move || scheduler.run())
            .context("spawn worker thread")?;
        info!("service started");
        Ok(Self {
            stop,
            worker: Some(worker),
        })
    }

    /// Validate the config and start a worker for it.
    pub fn start_with_config(cfg: &mut Config, sink: Box<dyn DiagnosticSink>) -> Result<Self> {
        Self::start(build_scheduler(cfg, sink)?)
    }

    /// Ask the worker to stop after the current file operation. Safe from any thread.
    pub fn stop(&self) {
        self.stop.request();
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|w| w.is_finished())
    }

    /// Wait for the worker; returns its fatal error if it died on one.
    pub fn join(mut self) -> Result<()> {
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("worker thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for MoverService {
    fn drop(&mut self) {
        self.stop.request();
    }
}
