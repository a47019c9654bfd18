// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::WatchOptions;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// poll_interval_ms = 2000
/// max_attempts = 150
///
/// [endpoint]
/// base_url = "https://billing.example.com"
/// start_path = "/api/invoices/{id}/regenerate"
/// state_path = "/api/invoices/{id}"
/// ```
///
/// Both sections are optional and have reasonable defaults, except that
/// `base_url` must be set (here or on the command line) before any request
/// is made.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub endpoint: EndpointSection,
}

/// Validated configuration. Only constructed through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub endpoint: EndpointSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, endpoint: EndpointSection) -> Self {
        Self { watch, endpoint }
    }
}

/// `[watch]` section: timing of the poll loop.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Fixed delay between polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of polls before giving up with `timed-out`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound for a single state read. Defaults to `poll_interval_ms`.
    #[serde(default)]
    pub poll_timeout_ms: Option<u64>,

    /// If set, this many failed polls in a row end the session early with
    /// `poll-unreachable`.
    #[serde(default)]
    pub max_consecutive_poll_failures: Option<u32>,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_max_attempts() -> u32 {
    150
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            poll_timeout_ms: None,
            max_consecutive_poll_failures: None,
        }
    }
}

impl WatchSection {
    pub fn options(&self) -> WatchOptions {
        let poll_interval = Duration::from_millis(self.poll_interval_ms);
        WatchOptions {
            poll_interval,
            max_attempts: self.max_attempts,
            poll_timeout: self
                .poll_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(poll_interval),
            max_consecutive_poll_failures: self.max_consecutive_poll_failures,
        }
    }
}

/// `[endpoint]` section: where the REST collaborators live.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSection {
    #[serde(default)]
    pub base_url: String,

    /// Path of the start-regeneration call (POST). `{id}` is replaced with the
    /// URL-encoded resource id.
    #[serde(default = "default_start_path")]
    pub start_path: String,

    /// Path of the state read (GET).
    #[serde(default = "default_state_path")]
    pub state_path: String,

    /// JSON pointer to the resource object inside the state response, for
    /// APIs that wrap it (e.g. `/invoice`). Empty means the whole body.
    #[serde(default)]
    pub state_pointer: String,

    /// Environment variable holding a bearer token.
    #[serde(default)]
    pub token_env: Option<String>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_start_path() -> String {
    "/api/invoices/{id}/regenerate".to_string()
}

fn default_state_path() -> String {
    "/api/invoices/{id}".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for EndpointSection {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            start_path: default_start_path(),
            state_path: default_state_path(),
            state_pointer: String::new(),
            token_env: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
