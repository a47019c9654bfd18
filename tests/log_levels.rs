// tests/log_levels.rs

use tracing::Level;

use regenwatch::cli::LogLevel;
use regenwatch::logging::{parse_level_str, resolve_level};

#[test]
fn cli_flag_beats_environment() {
    assert_eq!(resolve_level(Some(LogLevel::Debug), Some("error")), Level::DEBUG);
}

#[test]
fn environment_applies_without_flag() {
    assert_eq!(resolve_level(None, Some(" Trace ")), Level::TRACE);
    assert_eq!(resolve_level(None, Some("warning")), Level::WARN);
}

#[test]
fn unparsable_or_missing_environment_falls_back_to_info() {
    assert_eq!(resolve_level(None, Some("chatty")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);
    assert_eq!(parse_level_str(""), None);
}
