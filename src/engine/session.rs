// src/engine/session.rs

//! Pure watch session state machine.
//!
//! A synchronous, deterministic record of one watch: it consumes
//! [`WatchEvent`]s and returns a [`Resolution`] for the first event that
//! decides the outcome. Every event after that is ignored.
//!
//! The session has no Tokio types and performs no IO, so first-writer-wins
//! arbitration can be tested by feeding events in any order.

use tracing::{debug, info, warn};

use crate::engine::{PollFailure, Resolution, WatchEvent, WatchOptions};
use crate::types::{Baseline, JobResult, WatchedResource};

#[derive(Debug)]
pub struct WatchSession {
    baseline: Baseline,
    attempts_made: u32,
    max_attempts: u32,
    consecutive_poll_failures: u32,
    max_consecutive_poll_failures: Option<u32>,
    completed: bool,
}

impl WatchSession {
    pub fn new(baseline: Baseline, options: &WatchOptions) -> Self {
        let options = options.normalized();
        Self {
            baseline,
            attempts_made: 0,
            max_attempts: options.max_attempts,
            consecutive_poll_failures: 0,
            max_consecutive_poll_failures: options.max_consecutive_poll_failures,
            completed: false,
        }
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Handle a single event. Returns `Some` only for the event that resolves
    /// the session.
    pub fn step(&mut self, event: WatchEvent) -> Option<Resolution> {
        if self.completed {
            debug!(?event, "session already resolved; ignoring late event");
            return None;
        }

        match event {
            WatchEvent::PollObserved { state } => self.handle_poll_observed(state),
            WatchEvent::PollSkipped { failure } => self.handle_poll_skipped(failure),
            WatchEvent::StartSettled(result) => self.handle_start_settled(result),
        }
    }

    fn handle_poll_observed(&mut self, state: WatchedResource) -> Option<Resolution> {
        self.attempts_made += 1;
        self.consecutive_poll_failures = 0;

        if self.baseline.is_diverged(&state) {
            info!(
                attempt = self.attempts_made,
                baseline_version = self.baseline.version,
                version = state.version,
                last_modified_at = ?state.last_modified_at,
                "poll observed regeneration"
            );
            return self.resolve(Resolution::CompletedViaPoll(state));
        }

        debug!(
            attempt = self.attempts_made,
            version = state.version,
            "poll observed no change"
        );
        self.check_attempts_exhausted()
    }

    fn handle_poll_skipped(&mut self, failure: PollFailure) -> Option<Resolution> {
        self.attempts_made += 1;
        self.consecutive_poll_failures += 1;

        debug!(
            attempt = self.attempts_made,
            consecutive = self.consecutive_poll_failures,
            ?failure,
            "poll skipped"
        );

        if let Some(limit) = self.max_consecutive_poll_failures {
            if self.consecutive_poll_failures >= limit {
                warn!(
                    consecutive = self.consecutive_poll_failures,
                    limit, "state endpoint unreachable; giving up on polling"
                );
                return self.resolve(Resolution::PollUnreachable);
            }
        }

        self.check_attempts_exhausted()
    }

    fn handle_start_settled(&mut self, result: Result<JobResult, String>) -> Option<Resolution> {
        match result {
            Ok(JobResult::Accepted) => {
                info!(
                    attempts = self.attempts_made,
                    "start call settled before polling saw a change"
                );
                self.resolve(Resolution::CompletedViaRequest)
            }
            Ok(JobResult::Rejected(message)) | Err(message) => {
                warn!(%message, "start call failed");
                self.resolve(Resolution::Failed(message))
            }
        }
    }

    fn check_attempts_exhausted(&mut self) -> Option<Resolution> {
        if self.attempts_made >= self.max_attempts {
            info!(
                attempts = self.attempts_made,
                "poll attempts exhausted without observing a change"
            );
            return self.resolve(Resolution::TimedOut);
        }
        None
    }

    /// The single check-and-set point for `completed`.
    fn resolve(&mut self, resolution: Resolution) -> Option<Resolution> {
        if self.completed {
            return None;
        }
        self.completed = true;
        Some(resolution)
    }
}
