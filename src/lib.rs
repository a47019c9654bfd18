// src/lib.rs

pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::backend::{HttpBackend, RegenerationBackend};
use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_from_path};
use crate::engine::{CompletionWatcher, capture_baseline};
use crate::types::{Baseline, WatchOutcome, WatchStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - the HTTP backend
/// - baseline capture, the watch itself, and Ctrl-C handling
/// - one final refresh when the watch ends without observing completion
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_with_overrides(&args)?;

    if args.dry_run {
        print_dry_run(&cfg, args.resource.as_deref());
        return Ok(());
    }

    let resource_id = args
        .resource
        .clone()
        .ok_or_else(|| anyhow!("--resource is required unless --dry-run is given"))?;

    let backend: Arc<dyn RegenerationBackend> = Arc::new(HttpBackend::from_config(&cfg.endpoint)?);
    let watcher = CompletionWatcher::new(cfg.watch.options());

    let baseline = capture_baseline(backend.as_ref(), &resource_id).await?;
    info!(
        resource = %resource_id,
        version = baseline.version,
        last_modified_at = ?baseline.last_modified_at,
        "baseline captured; triggering regeneration"
    );

    let mut outcome = tokio::select! {
        res = watcher.watch(&resource_id, baseline.clone(), Arc::clone(&backend)) => res?,
        _ = tokio::signal::ctrl_c() => {
            warn!(
                resource = %resource_id,
                "interrupted; the regeneration job may still be running server-side"
            );
            return Ok(());
        }
    };

    if !outcome.status.is_completed() {
        debug!(resource = %resource_id, status = %outcome.status, "performing final refresh");
        outcome.final_state = watcher
            .authoritative_refresh(backend.as_ref(), &resource_id)
            .await;
    }

    print_report(&resource_id, &baseline, &outcome);
    Ok(())
}

/// Load the config file named on the command line and apply CLI overrides
/// before validating.
pub fn load_with_overrides(args: &CliArgs) -> errors::Result<ConfigFile> {
    let mut raw = load_from_path(&args.config)?;

    if let Some(ref base_url) = args.base_url {
        raw.endpoint.base_url = base_url.clone();
    }
    if let Some(ms) = args.poll_interval_ms {
        raw.watch.poll_interval_ms = ms;
    }
    if let Some(n) = args.max_attempts {
        raw.watch.max_attempts = n;
    }

    ConfigFile::try_from(raw)
}

fn print_report(resource_id: &str, baseline: &Baseline, outcome: &WatchOutcome) {
    println!("regenwatch: {resource_id}");
    println!("  status: {}", outcome.status);
    println!("  polls: {}", outcome.attempts_made);
    println!(
        "  baseline: version {} modified {}",
        baseline.version,
        baseline.last_modified_at.as_deref().unwrap_or("-")
    );

    match outcome.final_state {
        Some(ref state) => println!(
            "  current:  version {} modified {}",
            state.version,
            state.last_modified_at.as_deref().unwrap_or("-")
        ),
        None => println!("  current:  unavailable"),
    }

    match outcome.status {
        WatchStatus::CompletedViaPoll | WatchStatus::CompletedViaRequest => {}
        WatchStatus::TimedOut | WatchStatus::PollUnreachable => {
            let changed = outcome
                .final_state
                .as_ref()
                .is_some_and(|state| baseline.is_diverged(state));
            if changed {
                println!("  note: the resource changed after the watch window closed");
            } else {
                println!("  note: the job may still be running; retry or check again later");
            }
        }
    }
}

fn print_dry_run(cfg: &ConfigFile, resource: Option<&str>) {
    let options = cfg.watch.options();

    println!("regenwatch dry-run");
    if let Some(resource) = resource {
        println!("  resource = {resource}");
    }
    println!("  watch.poll_interval_ms = {}", cfg.watch.poll_interval_ms);
    println!("  watch.max_attempts = {}", cfg.watch.max_attempts);
    println!("  watch.poll_timeout_ms = {}", options.poll_timeout.as_millis());
    match cfg.watch.max_consecutive_poll_failures {
        Some(n) => println!("  watch.max_consecutive_poll_failures = {n}"),
        None => println!("  watch.max_consecutive_poll_failures = unlimited"),
    }
    println!("  worst-case watch time = {:?}", options.time_bound());
    println!();

    println!("endpoint:");
    if cfg.endpoint.base_url.is_empty() {
        println!("  base_url: (unset)");
    } else {
        println!("  base_url: {}", cfg.endpoint.base_url);
    }
    println!("  start: POST {}", cfg.endpoint.start_path);
    println!("  state: GET {}", cfg.endpoint.state_path);
    if !cfg.endpoint.state_pointer.is_empty() {
        println!("  state_pointer: {}", cfg.endpoint.state_pointer);
    }
    if let Some(ref var) = cfg.endpoint.token_env {
        println!("  token_env: {var}");
    }
    println!("  request_timeout_ms: {}", cfg.endpoint.request_timeout_ms);

    debug!("dry-run complete (no requests sent)");
}
