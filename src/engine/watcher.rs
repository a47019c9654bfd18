// src/engine/watcher.rs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::{FnBackend, RegenerationBackend};
use crate::errors::{Result, WatchError};
use crate::types::{Baseline, JobResult, WatchOutcome, WatchStatus, WatchedResource};

use super::session::WatchSession;
use super::{PollFailure, Resolution, WatchEvent, WatchOptions};

/// Drives a [`WatchSession`] from two concurrently running paths:
///
/// - the start call, spawned once and never cancelled
/// - the poll loop, which reads the resource on a fixed cadence
///
/// Both paths send [`WatchEvent`]s over one channel to the session, so the
/// first event that resolves it wins and everything after is dropped.
#[derive(Debug, Clone)]
pub struct CompletionWatcher {
    options: WatchOptions,
}

impl CompletionWatcher {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options: options.normalized(),
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Trigger a regeneration of `resource_id` and wait until it is observed,
    /// the start call settles, or the poll budget runs out.
    ///
    /// `baseline` must have been read before this call so that a fast
    /// regeneration is not missed.
    ///
    /// A failed start call is returned as [`WatchError::StartAction`] unless
    /// polling had already observed the change. `timed-out` is an `Ok`
    /// outcome; the caller decides whether to refresh once more.
    pub async fn watch(
        &self,
        resource_id: &str,
        baseline: Baseline,
        backend: Arc<dyn RegenerationBackend>,
    ) -> Result<WatchOutcome> {
        info!(
            resource = resource_id,
            baseline_version = baseline.version,
            baseline_modified_at = ?baseline.last_modified_at,
            poll_interval_ms = self.options.poll_interval.as_millis() as u64,
            max_attempts = self.options.max_attempts,
            "watching regeneration"
        );

        let (event_tx, mut event_rx) = mpsc::channel::<WatchEvent>(16);

        spawn_start_action(resource_id.to_string(), Arc::clone(&backend), event_tx.clone());
        spawn_poll_loop(
            resource_id.to_string(),
            Arc::clone(&backend),
            self.options,
            event_tx,
        );

        let mut session = WatchSession::new(baseline, &self.options);

        let resolution = loop {
            let event = match event_rx.recv().await {
                Some(e) => e,
                None => {
                    warn!(
                        resource = resource_id,
                        "watch paths ended without resolving; treating as timed out"
                    );
                    break Resolution::TimedOut;
                }
            };

            if let Some(resolution) = session.step(event) {
                break resolution;
            }
        };

        // Closing the channel stops the poll loop and turns late results from
        // the start call into no-ops.
        drop(event_rx);

        self.finish(resource_id, resolution, session.attempts_made(), backend.as_ref())
            .await
    }

    async fn finish(
        &self,
        resource_id: &str,
        resolution: Resolution,
        attempts_made: u32,
        backend: &dyn RegenerationBackend,
    ) -> Result<WatchOutcome> {
        let (status, final_state) = match resolution {
            Resolution::CompletedViaPoll(state) => (WatchStatus::CompletedViaPoll, Some(state)),
            Resolution::CompletedViaRequest => {
                let state = self.authoritative_refresh(backend, resource_id).await;
                (WatchStatus::CompletedViaRequest, state)
            }
            Resolution::TimedOut => (WatchStatus::TimedOut, None),
            Resolution::PollUnreachable => (WatchStatus::PollUnreachable, None),
            Resolution::Failed(message) => {
                return Err(WatchError::StartAction {
                    resource: resource_id.to_string(),
                    message,
                });
            }
        };

        info!(
            resource = resource_id,
            %status,
            attempts = attempts_made,
            final_version = final_state.as_ref().map(|s| s.version),
            "watch resolved"
        );

        Ok(WatchOutcome {
            status,
            final_state,
            attempts_made,
        })
    }

    /// One bounded state read. Failures are logged and yield `None`.
    pub async fn authoritative_refresh(
        &self,
        backend: &dyn RegenerationBackend,
        resource_id: &str,
    ) -> Option<WatchedResource> {
        match time::timeout(self.options.poll_timeout, backend.fetch_current(resource_id)).await {
            Ok(Ok(state)) => state,
            Ok(Err(err)) => {
                warn!(resource = resource_id, error = %err, "authoritative refresh failed");
                None
            }
            Err(_) => {
                warn!(resource = resource_id, "authoritative refresh timed out");
                None
            }
        }
    }
}

/// Read the resource once to use as the baseline for a watch.
pub async fn capture_baseline(
    backend: &dyn RegenerationBackend,
    resource_id: &str,
) -> Result<Baseline> {
    let state = backend
        .fetch_current(resource_id)
        .await?
        .ok_or_else(|| WatchError::ResourceNotFound(resource_id.to_string()))?;

    debug!(
        resource = resource_id,
        version = state.version,
        last_modified_at = ?state.last_modified_at,
        "captured baseline"
    );

    Ok(Baseline::from(&state))
}

/// Closure form of [`CompletionWatcher::watch`].
pub async fn watch_fn<S, SFut, F, FFut>(
    resource_id: &str,
    baseline: Baseline,
    options: WatchOptions,
    start_action: S,
    fetch_current: F,
) -> Result<WatchOutcome>
where
    S: Fn() -> SFut + Send + Sync + 'static,
    SFut: Future<Output = Result<JobResult>> + Send + 'static,
    F: Fn() -> FFut + Send + Sync + 'static,
    FFut: Future<Output = Result<Option<WatchedResource>>> + Send + 'static,
{
    let backend: Arc<dyn RegenerationBackend> =
        Arc::new(FnBackend::new(start_action, fetch_current));
    CompletionWatcher::new(options)
        .watch(resource_id, baseline, backend)
        .await
}

fn spawn_start_action(
    resource_id: String,
    backend: Arc<dyn RegenerationBackend>,
    event_tx: mpsc::Sender<WatchEvent>,
) {
    tokio::spawn(async move {
        let result = backend
            .start_regeneration(&resource_id)
            .await
            .map_err(|e| e.to_string());

        debug!(resource = %resource_id, ?result, "start call settled");

        if event_tx.send(WatchEvent::StartSettled(result)).await.is_err() {
            debug!(
                resource = %resource_id,
                "session already resolved; discarding start call result"
            );
        }
    });
}

fn spawn_poll_loop(
    resource_id: String,
    backend: Arc<dyn RegenerationBackend>,
    options: WatchOptions,
    event_tx: mpsc::Sender<WatchEvent>,
) {
    tokio::spawn(async move {
        let period = options.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for attempt in 1..=options.max_attempts {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = event_tx.closed() => {
                    debug!(resource = %resource_id, attempt, "session resolved; stopping poll loop");
                    return;
                }
            }

            let event = poll_once(backend.as_ref(), &resource_id, options.poll_timeout).await;

            if event_tx.send(event).await.is_err() {
                debug!(resource = %resource_id, attempt, "session resolved; dropping poll result");
                return;
            }
        }

        debug!(resource = %resource_id, "poll loop finished");
    });
}

async fn poll_once(
    backend: &dyn RegenerationBackend,
    resource_id: &str,
    poll_timeout: Duration,
) -> WatchEvent {
    match time::timeout(poll_timeout, backend.fetch_current(resource_id)).await {
        Ok(Ok(Some(state))) => WatchEvent::PollObserved { state },
        Ok(Ok(None)) => WatchEvent::PollSkipped {
            failure: PollFailure::Missing,
        },
        Ok(Err(err)) => {
            debug!(resource = resource_id, error = %err, "state read failed");
            WatchEvent::PollSkipped {
                failure: PollFailure::Failed(err.to_string()),
            }
        }
        Err(_) => WatchEvent::PollSkipped {
            failure: PollFailure::TimedOut,
        },
    }
}
