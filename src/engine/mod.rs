// src/engine/mod.rs

//! Completion watcher engine.
//!
//! Detects when a server-side regeneration job has taken effect without a
//! push channel, by racing the start call against a poll loop:
//! - the start call settles (accepted / rejected / failed)
//! - each poll observes the resource state, or is skipped
//!
//! The pure session state machine lives in [`session`]; the async/IO shell
//! that spawns both paths and feeds their events into the session is
//! implemented in [`watcher`].

use std::time::Duration;

use crate::types::{JobResult, WatchedResource};

/// Timing and bounds for a single watch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Fixed cadence between polls. The first poll happens one interval after
    /// the session starts.
    pub poll_interval: Duration,
    /// Polls made before the session resolves `timed-out`.
    pub max_attempts: u32,
    /// Upper bound for a single state read; a slower read counts as a
    /// skipped poll.
    pub poll_timeout: Duration,
    /// Consecutive skipped polls that end the session with
    /// `poll-unreachable`. `None` never ends it early.
    pub max_consecutive_poll_failures: Option<u32>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2_000),
            max_attempts: 150,
            poll_timeout: Duration::from_millis(2_000),
            max_consecutive_poll_failures: None,
        }
    }
}

impl WatchOptions {
    /// At least one poll, on a non-zero cadence. The poll loop and the
    /// session both rely on these bounds to end the watch.
    pub fn normalized(self) -> Self {
        Self {
            poll_interval: self.poll_interval.max(Duration::from_millis(1)),
            max_attempts: self.max_attempts.max(1),
            ..self
        }
    }

    /// Worst-case time until the poll path resolves on its own.
    pub fn time_bound(&self) -> Duration {
        let options = self.normalized();
        options.poll_interval * options.max_attempts + options.poll_timeout
    }
}

/// Why a poll produced no usable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The state read returned nothing (resource transiently unavailable).
    Missing,
    /// The state read returned an error.
    Failed(String),
    /// The state read did not finish within `poll_timeout`.
    TimedOut,
}

/// Events flowing into a watch session from the poll loop and the start call.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A poll returned the current resource state.
    PollObserved { state: WatchedResource },
    /// A poll was skipped; it still counts as an attempt.
    PollSkipped { failure: PollFailure },
    /// The start call settled. `Err` carries the failure message.
    StartSettled(Result<JobResult, String>),
}

/// Terminal decision of a session. Produced at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    CompletedViaPoll(WatchedResource),
    CompletedViaRequest,
    TimedOut,
    PollUnreachable,
    Failed(String),
}

pub mod session;
pub mod watcher;

pub use session::WatchSession;
pub use watcher::{CompletionWatcher, capture_baseline, watch_fn};
