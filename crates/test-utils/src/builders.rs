#![allow(dead_code)]

use std::time::Duration;

use regenwatch::config::{ConfigFile, EndpointSection, RawConfigFile, WatchSection};
use regenwatch::engine::WatchOptions;
use regenwatch::types::{Baseline, WatchedResource};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                watch: WatchSection::default(),
                endpoint: EndpointSection::default(),
            },
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.endpoint.base_url = url.to_string();
        self
    }

    pub fn start_path(mut self, path: &str) -> Self {
        self.config.endpoint.start_path = path.to_string();
        self
    }

    pub fn state_path(mut self, path: &str) -> Self {
        self.config.endpoint.state_path = path.to_string();
        self
    }

    pub fn state_pointer(mut self, pointer: &str) -> Self {
        self.config.endpoint.state_pointer = pointer.to_string();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.watch.poll_interval_ms = ms;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.watch.max_attempts = n;
        self
    }

    pub fn max_consecutive_poll_failures(mut self, n: u32) -> Self {
        self.config.watch.max_consecutive_poll_failures = Some(n);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Options with the production cadence (2s × 150) unless overridden.
pub struct OptionsBuilder {
    options: WatchOptions,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: WatchOptions::default(),
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self.options.poll_timeout = interval;
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.options.poll_timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.options.max_attempts = n;
        self
    }

    pub fn max_consecutive_poll_failures(mut self, n: u32) -> Self {
        self.options.max_consecutive_poll_failures = Some(n);
        self
    }

    pub fn build(self) -> WatchOptions {
        self.options
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoice state with the given version and timestamp.
pub fn invoice(id: &str, version: u64, modified_at: &str) -> WatchedResource {
    WatchedResource::new(id, version, Some(modified_at))
}

pub fn baseline_of(resource: &WatchedResource) -> Baseline {
    Baseline::from(resource)
}
