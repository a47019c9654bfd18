// src/config/mod.rs

//! Configuration loading and validation for regenwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate timing bounds and endpoint settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, EndpointSection, RawConfigFile, WatchSection};
pub use validate::{validate_base_url, validate_config};
