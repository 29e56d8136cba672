//! Application orchestrator.
//! Loads/merges config, initializes logging, validates the directories, then
//! either runs one pass or starts the worker and waits for Ctrl-C.

use anyhow::{Context, Result};
use tracing::{debug, info};

use bundle_mover::cli::Args;
use bundle_mover::config::{Config, default_config_path, default_log_path, load_config, load_config_from_xml_path};
use bundle_mover::output as out;
use bundle_mover::{MoverService, TracingSink, build_scheduler};

use crate::logging::init_tracing;

const EXAMPLE_CONFIG: &str = "<config>
  <source_directory>/path/to/inbox</source_directory>
  <xml_destination_directory>/path/to/xml</xml_destination_directory>
  <attachment_destination_directory>/path/to/attachments</attachment_destination_directory>
  <reset_permissions_after_move>false</reset_permissions_after_move>
  <log_level>normal</log_level>
</config>";

fn load(args: &Args) -> Result<Config> {
    let loaded = match args.config.as_deref() {
        Some(path) => Some(load_config_from_xml_path(path)?),
        None => load_config()?,
    };
    let mut cfg = loaded.unwrap_or_else(|| Config {
        log_file: default_log_path(),
        ..Default::default()
    });
    args.apply_overrides(&mut cfg);
    Ok(cfg)
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        match args.config.clone().or_else(default_config_path) {
            Some(p) => {
                out::print_info(&format!("bundle_mover config path:\n  {}\n", p.display()));
                if !p.exists() {
                    out::print_info(&format!("No config file exists there yet. Example:\n\n{EXAMPLE_CONFIG}\n"));
                }
            }
            None => out::print_error("Could not determine a default config path"),
        }
        return Ok(());
    }

    let mut cfg = load(&args).map_err(|e| {
        out::print_error(&format!("{e:#}"));
        e
    })?;

    let guard = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;
    debug!(?args, "starting bundle_mover");

    let result = (|| -> Result<()> {
        let mut scheduler = build_scheduler(&mut cfg, Box::new(TracingSink)).map_err(|e| {
            out::print_error(&format!("{e:#}"));
            e
        })?;

        if args.once {
            let summary = scheduler.run_pass()?;
            info!(?summary, "single pass complete");
            out::print_success(&format!(
                "{} manifest(s) seen, {} bundle(s) moved, {} failed",
                summary.manifests, summary.moved, summary.failed
            ));
            return Ok(());
        }

        let service = MoverService::start(scheduler)?;
        let stop = service.stop_flag();
        ctrlc::set_handler(move || {
            stop.request();
            out::print_warn("Received interrupt; stopping after the current file...");
        })
        .context("install signal handler")?;
        out::print_info("Watching inbox; press Ctrl-C to stop.");
        service.join()
    })();

    // Flush file logs before exit.
    drop(guard);
    result
}
