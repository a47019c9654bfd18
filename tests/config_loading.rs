// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use regenwatch::cli::CliArgs;
use regenwatch::config::load_and_validate;
use regenwatch::errors::WatchError;
use regenwatch::load_with_overrides;
use regenwatch_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn args_for(file: &NamedTempFile) -> CliArgs {
    CliArgs {
        config: file.path().to_string_lossy().into_owned(),
        resource: Some("INV-1".to_string()),
        base_url: None,
        poll_interval_ms: None,
        max_attempts: None,
        log_level: None,
        dry_run: false,
    }
}

#[test]
fn empty_file_uses_production_defaults() {
    let file = write_config("");

    let cfg = load_and_validate(file.path()).unwrap();
    let options = cfg.watch.options();

    assert_eq!(options.poll_interval, Duration::from_millis(2_000));
    assert_eq!(options.max_attempts, 150);
    assert_eq!(options.poll_timeout, options.poll_interval);
    assert_eq!(options.max_consecutive_poll_failures, None);
    assert_eq!(cfg.endpoint.start_path, "/api/invoices/{id}/regenerate");
    assert_eq!(cfg.endpoint.state_path, "/api/invoices/{id}");
    assert_eq!(cfg.endpoint.request_timeout_ms, 10_000);
}

#[test]
fn full_file_is_loaded() {
    let file = write_config(
        r#"
[watch]
poll_interval_ms = 500
max_attempts = 20
poll_timeout_ms = 250
max_consecutive_poll_failures = 5

[endpoint]
base_url = "https://billing.example.com"
start_path = "/v2/invoices/{id}:regenerate"
state_path = "/v2/invoices/{id}"
state_pointer = "/data/invoice"
token_env = "BILLING_TOKEN"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let options = cfg.watch.options();

    assert_eq!(options.poll_interval, Duration::from_millis(500));
    assert_eq!(options.poll_timeout, Duration::from_millis(250));
    assert_eq!(options.max_attempts, 20);
    assert_eq!(options.max_consecutive_poll_failures, Some(5));
    assert_eq!(cfg.endpoint.state_pointer, "/data/invoice");
    assert_eq!(cfg.endpoint.token_env.as_deref(), Some("BILLING_TOKEN"));
}

#[test]
fn zero_poll_interval_is_rejected() {
    let file = write_config("[watch]\npoll_interval_ms = 0\n");

    match load_and_validate(file.path()) {
        Err(WatchError::ConfigError(msg)) => assert!(msg.contains("poll_interval_ms")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn zero_max_attempts_is_rejected() {
    let file = write_config("[watch]\nmax_attempts = 0\n");

    match load_and_validate(file.path()) {
        Err(WatchError::ConfigError(msg)) => assert!(msg.contains("max_attempts")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn path_template_without_placeholder_is_rejected() {
    let file = write_config("[endpoint]\nstate_path = \"/api/invoices/current\"\n");

    match load_and_validate(file.path()) {
        Err(WatchError::ConfigError(msg)) => {
            assert!(msg.contains("state_path"));
            assert!(msg.contains("{id}"));
        }
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn non_http_base_url_is_rejected() {
    let file = write_config("[endpoint]\nbase_url = \"ftp://billing.example.com\"\n");

    match load_and_validate(file.path()) {
        Err(WatchError::ConfigError(msg)) => assert!(msg.contains("ftp")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn relative_state_pointer_is_rejected() {
    let file = write_config("[endpoint]\nstate_pointer = \"invoice\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchError::ConfigError(_))
    ));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[watch\npoll_interval_ms = 1");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Regenwatch.toml");

    assert!(matches!(result, Err(WatchError::IoError(_))));
}

#[test]
fn cli_overrides_take_precedence_over_file() {
    let file = write_config(
        r#"
[watch]
poll_interval_ms = 500
max_attempts = 20

[endpoint]
base_url = "https://old.example.com"
"#,
    );

    let mut args = args_for(&file);
    args.base_url = Some("http://127.0.0.1:8080".to_string());
    args.poll_interval_ms = Some(100);
    args.max_attempts = Some(3);

    let cfg = load_with_overrides(&args).unwrap();

    assert_eq!(cfg.endpoint.base_url, "http://127.0.0.1:8080");
    assert_eq!(cfg.watch.poll_interval_ms, 100);
    assert_eq!(cfg.watch.max_attempts, 3);
}

#[test]
fn cli_overrides_are_validated() {
    let file = write_config("");

    let mut args = args_for(&file);
    args.max_attempts = Some(0);

    assert!(matches!(
        load_with_overrides(&args),
        Err(WatchError::ConfigError(_))
    ));
}

#[test]
fn builder_produces_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .base_url("http://localhost:9000")
        .poll_interval_ms(50)
        .max_attempts(10)
        .build();

    assert_eq!(cfg.watch.options().poll_interval, Duration::from_millis(50));
    assert_eq!(cfg.endpoint.base_url, "http://localhost:9000");
}
