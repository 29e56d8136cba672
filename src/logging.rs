//! Tracing initialization.
//! Builds a subscriber with EnvFilter, compact or JSON formatting, and optional file logging.
//!
//! Behavior:
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - If `log_file` is provided and passes safety checks, a non-blocking file layer is added.
//! - File logging is refused when any ancestor of the file path is a symlink.

use anyhow::Result;
use bundle_mover::config::{LogLevel, path_has_symlink_ancestor};
use bundle_mover::output as out;
use bundle_mover::platform::open_log_file_secure_append;
use chrono::Local;
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

/// One formatting layer writing to stdout or the given file writer.
fn fmt_layer(json: bool, writer: Option<NonBlocking>) -> BoxedLayer {
    let base = tsfmt::layer()
        .with_timer(LocalHumanTime)
        .with_level(true)
        .with_target(true)
        .with_thread_names(true);
    match (json, writer) {
        (true, Some(w)) => base.json().with_ansi(false).with_writer(w).boxed(),
        (true, None) => base.json().boxed(),
        (false, Some(w)) => base.compact().with_ansi(false).with_writer(w).boxed(),
        (false, None) => base.compact().boxed(),
    }
}

/// Open a non-blocking file writer, or explain on stderr why not.
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            eprintln!(
                "Refusing to enable file logging: ancestor of {} is a symlink.",
                path.display()
            );
            return None;
        }
        Err(e) => {
            eprintln!("Error checking log path {} for symlinks: {}", path.display(), e);
            return None;
        }
    }
    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Initialize tracing. Returns the file appender guard, which must be held
/// until shutdown so buffered lines are flushed.
pub fn init_tracing(lvl: &LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(json, None)];
    let mut guard = None;

    if let Some(path) = log_file {
        match maybe_open_non_blocking_writer(path) {
            Some((writer, g)) => {
                layers.push(fmt_layer(json, Some(writer)));
                guard = Some(g);
            }
            None => out::print_warn(&format!(
                "File logging to '{}' was not enabled; logs continue on stdout.",
                path.display()
            )),
        }
    }

    let filter = EnvFilter::default().add_directive(to_level_filter(lvl).into());
    registry().with(layers).with(filter).try_init()?;
    Ok(guard)
}
