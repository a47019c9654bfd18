// src/backend/mod.rs

//! Pluggable collaborators for the completion watcher.
//!
//! The watcher talks to a `RegenerationBackend` instead of a concrete HTTP
//! client, so tests can script start/poll behaviour while production uses
//! [`HttpBackend`].
//!
//! - `HttpBackend` calls the billing REST API.
//! - `FnBackend` adapts a pair of closures, for callers that already hold
//!   their own request functions.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::{JobResult, WatchedResource};

pub mod http;

pub use http::HttpBackend;

/// Boxed future returned by backend calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The two external calls the watcher depends on.
pub trait RegenerationBackend: Send + Sync {
    /// Trigger the regeneration job. Resolves once the server has accepted or
    /// rejected the job, not when the job finishes. Called at most once per
    /// watch session.
    fn start_regeneration(&self, resource_id: &str) -> BackendFuture<'_, JobResult>;

    /// Read the current state of the resource. `Ok(None)` means the resource
    /// is transiently unavailable.
    fn fetch_current(&self, resource_id: &str) -> BackendFuture<'_, Option<WatchedResource>>;
}

/// Backend built from two closures that already know which resource they
/// act on.
pub struct FnBackend<S, F> {
    start: S,
    fetch: F,
}

impl<S, F> FnBackend<S, F> {
    pub fn new(start: S, fetch: F) -> Self {
        Self { start, fetch }
    }
}

impl<S, SFut, F, FFut> RegenerationBackend for FnBackend<S, F>
where
    S: Fn() -> SFut + Send + Sync,
    SFut: Future<Output = Result<JobResult>> + Send + 'static,
    F: Fn() -> FFut + Send + Sync,
    FFut: Future<Output = Result<Option<WatchedResource>>> + Send + 'static,
{
    fn start_regeneration(&self, _resource_id: &str) -> BackendFuture<'_, JobResult> {
        Box::pin((self.start)())
    }

    fn fetch_current(&self, _resource_id: &str) -> BackendFuture<'_, Option<WatchedResource>> {
        Box::pin((self.fetch)())
    }
}
