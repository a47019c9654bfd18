#![allow(dead_code)]

pub use regenwatch_test_utils::builders::{OptionsBuilder, baseline_of, invoice};
pub use regenwatch_test_utils::init_tracing;
pub use regenwatch_test_utils::scripted_backend::{PollScript, ScriptedBackend, StartScript};

pub const T0: &str = "2025-01-01T00:00:00Z";
pub const T1: &str = "2025-01-01T00:05:00Z";

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
