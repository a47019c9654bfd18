use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use regenwatch::backend::{BackendFuture, RegenerationBackend};
use regenwatch::errors::WatchError;
use regenwatch::types::{JobResult, WatchedResource};

/// How the start call behaves.
#[derive(Debug, Clone)]
pub enum StartScript {
    /// Resolve `Accepted` after the delay.
    AcceptAfter(Duration),
    /// Resolve `Rejected(reason)` after the delay.
    RejectAfter(Duration, String),
    /// Fail with a transport-style error after the delay.
    FailAfter(Duration, String),
    /// Never settle.
    Never,
}

/// Response to a single state read.
#[derive(Debug, Clone)]
pub enum PollScript {
    State(WatchedResource),
    Missing,
    Fail(String),
    /// Never return.
    Hang,
}

/// A fake backend that:
/// - settles the start call according to a `StartScript`
/// - answers state reads from a queue of `PollScript`s, repeating the last
///   entry once the queue is down to one
/// - counts calls to both
#[derive(Clone)]
pub struct ScriptedBackend {
    start: StartScript,
    polls: Arc<Mutex<VecDeque<PollScript>>>,
    start_calls: Arc<AtomicU32>,
    fetch_calls: Arc<AtomicU32>,
}

impl ScriptedBackend {
    pub fn new(start: StartScript) -> Self {
        Self {
            start,
            polls: Arc::new(Mutex::new(VecDeque::new())),
            start_calls: Arc::new(AtomicU32::new(0)),
            fetch_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_polls(self, polls: impl IntoIterator<Item = PollScript>) -> Self {
        self.polls.lock().unwrap().extend(polls);
        self
    }

    pub fn start_calls(&self) -> u32 {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn next_poll(&self) -> PollScript {
        let mut polls = self.polls.lock().unwrap();
        if polls.len() > 1 {
            polls.pop_front().unwrap_or(PollScript::Missing)
        } else {
            polls.front().cloned().unwrap_or(PollScript::Missing)
        }
    }
}

impl RegenerationBackend for ScriptedBackend {
    fn start_regeneration(&self, _resource_id: &str) -> BackendFuture<'_, JobResult> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.start.clone();

        Box::pin(async move {
            match script {
                StartScript::AcceptAfter(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(JobResult::Accepted)
                }
                StartScript::RejectAfter(delay, reason) => {
                    tokio::time::sleep(delay).await;
                    Ok(JobResult::Rejected(reason))
                }
                StartScript::FailAfter(delay, message) => {
                    tokio::time::sleep(delay).await;
                    Err(WatchError::Other(anyhow::anyhow!(message)))
                }
                StartScript::Never => std::future::pending().await,
            }
        })
    }

    fn fetch_current(&self, _resource_id: &str) -> BackendFuture<'_, Option<WatchedResource>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.next_poll();

        Box::pin(async move {
            match script {
                PollScript::State(state) => Ok(Some(state)),
                PollScript::Missing => Ok(None),
                PollScript::Fail(message) => Err(WatchError::Other(anyhow::anyhow!(message))),
                PollScript::Hang => std::future::pending().await,
            }
        })
    }
}
