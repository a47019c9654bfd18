// src/config/validate.rs

use reqwest::Url;

use crate::config::model::{ConfigFile, EndpointSection, RawConfigFile, WatchSection};
use crate::errors::{Result, WatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.endpoint))
    }
}

/// Run every check on a raw config without consuming it.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch(&cfg.watch)?;
    validate_endpoint(&cfg.endpoint)?;
    Ok(())
}

fn validate_watch(watch: &WatchSection) -> Result<()> {
    if watch.poll_interval_ms == 0 {
        return Err(WatchError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if watch.max_attempts == 0 {
        return Err(WatchError::ConfigError(
            "[watch].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    if watch.poll_timeout_ms == Some(0) {
        return Err(WatchError::ConfigError(
            "[watch].poll_timeout_ms must be >= 1 when set (got 0)".to_string(),
        ));
    }

    if watch.max_consecutive_poll_failures == Some(0) {
        return Err(WatchError::ConfigError(
            "[watch].max_consecutive_poll_failures must be >= 1 when set (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoint(endpoint: &EndpointSection) -> Result<()> {
    // An empty base URL is allowed here so that `--base-url` can supply it;
    // the HTTP backend refuses to start without one.
    if !endpoint.base_url.is_empty() {
        validate_base_url(&endpoint.base_url)?;
    }

    for (key, template) in [
        ("start_path", &endpoint.start_path),
        ("state_path", &endpoint.state_path),
    ] {
        if !template.contains("{id}") {
            return Err(WatchError::ConfigError(format!(
                "[endpoint].{key} must contain the `{{id}}` placeholder (got '{template}')"
            )));
        }
    }

    if !endpoint.state_pointer.is_empty() && !endpoint.state_pointer.starts_with('/') {
        return Err(WatchError::ConfigError(format!(
            "[endpoint].state_pointer must be empty or start with '/' (got '{}')",
            endpoint.state_pointer
        )));
    }

    if endpoint.request_timeout_ms == 0 {
        return Err(WatchError::ConfigError(
            "[endpoint].request_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

/// Check that `base_url` is an absolute http(s) URL.
pub fn validate_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).map_err(|e| {
        WatchError::ConfigError(format!("invalid [endpoint].base_url '{base_url}': {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WatchError::ConfigError(format!(
            "[endpoint].base_url must use http or https (got scheme '{other}')"
        ))),
    }
}
