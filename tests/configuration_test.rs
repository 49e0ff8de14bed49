// Configuration schema parsing and build-time validation
use aace_log_router::Router;
use aace_log_router::config::{
    ConfigError, DEFAULT_FILE_PREFIX, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE, RouterConfig, SinkType,
};
use aace_log_router::domain::Level;
use tempfile::TempDir;

#[test]
fn test_parse_full_document() {
    let json = r#"{
        "aace.logger": {
            "sinks": [
                { "id": "console", "type": "console", "rules": [{ "level": "Info" }] },
                { "id": "file1", "type": "file", "config": { "path": "/tmp" } }
            ],
            "rules": [
                { "sink": "file1", "rule": { "level": "Warn", "source": "aace\\..*" } }
            ]
        }
    }"#;

    let config = RouterConfig::from_json_str(json).unwrap();
    assert_eq!(config.sinks.len(), 2);
    assert_eq!(config.sinks[0].kind, SinkType::Console);
    assert_eq!(config.sinks[0].rules.len(), 1);
    assert_eq!(config.sinks[0].rules[0].level, Level::Info);

    // Unspecified file settings fall back to the documented defaults.
    let file = config.sinks[1].config.as_ref().unwrap();
    assert_eq!(file.prefix, DEFAULT_FILE_PREFIX);
    assert_eq!(file.max_size, DEFAULT_MAX_SIZE);
    assert_eq!(file.max_files, DEFAULT_MAX_FILES);
    assert!(file.append);

    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.rules[0].sink, "file1");
    assert_eq!(config.rules[0].rule.source, "aace\\..*");
}

#[test]
fn test_levels_parse_case_insensitively() {
    let json = r#"{
        "aace.logger": {
            "sinks": [
                { "id": "c", "type": "console", "rules": [
                    { "level": "verbose" },
                    { "level": "METADATA" },
                    { "level": "Critical" }
                ] }
            ]
        }
    }"#;

    let config = RouterConfig::from_json_str(json).unwrap();
    let levels: Vec<Level> = config.sinks[0].rules.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![Level::Verbose, Level::Metadata, Level::Critical]);
}

#[test]
fn test_unknown_level_fails_parse() {
    let json = r#"{
        "aace.logger": {
            "sinks": [
                { "id": "c", "type": "console", "rules": [{ "level": "Fatal" }] }
            ]
        }
    }"#;

    let err = RouterConfig::from_json_str(json).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("unknown log level"));
}

#[test]
fn test_unknown_sink_type_fails_parse() {
    let json = r#"{
        "aace.logger": {
            "sinks": [ { "id": "u", "type": "udp" } ]
        }
    }"#;

    assert!(matches!(
        RouterConfig::from_json_str(json).unwrap_err(),
        ConfigError::Parse(_)
    ));
}

#[test]
fn test_rule_without_level_fails_parse() {
    let json = r#"{
        "aace.logger": {
            "sinks": [
                { "id": "c", "type": "console", "rules": [{ "source": "core" }] }
            ]
        }
    }"#;

    assert!(matches!(
        RouterConfig::from_json_str(json).unwrap_err(),
        ConfigError::Parse(_)
    ));
}

#[tokio::test]
async fn test_dangling_rule_fails_build() {
    let config = RouterConfig::new()
        .console_sink("console", Level::Info)
        .rule("ghost", Level::Warn);

    let err = Router::build(config).await.unwrap_err();
    assert!(matches!(err, ConfigError::DanglingRule(ref id) if id == "ghost"));
}

#[tokio::test]
async fn test_invalid_filter_fails_build() {
    let config = RouterConfig::new()
        .console_sink("console", Level::Info)
        .rule_with("console", Level::Info, "(unclosed", "", "");

    let err = Router::build(config).await.unwrap_err();
    assert!(matches!(err, ConfigError::Filter { ref sink, .. } if sink == "console"));
}

#[tokio::test]
async fn test_non_positive_bounds_fail_build() {
    let dir = TempDir::new().unwrap();

    let config = RouterConfig::new().file_sink_with(
        "f",
        Level::Info,
        dir.path(),
        "log",
        0,
        3,
        true,
    );
    assert!(matches!(
        Router::build(config).await.unwrap_err(),
        ConfigError::InvalidSink { .. }
    ));

    let config = RouterConfig::new().file_sink_with(
        "f",
        Level::Info,
        dir.path(),
        "log",
        1024,
        0,
        true,
    );
    assert!(matches!(
        Router::build(config).await.unwrap_err(),
        ConfigError::InvalidSink { .. }
    ));
}

#[tokio::test]
async fn test_missing_directory_fails_build() {
    let config = RouterConfig::new().file_sink("f", Level::Info, "/no/such/directory");
    assert!(matches!(
        Router::build(config).await.unwrap_err(),
        ConfigError::InvalidSink { .. }
    ));
}

#[tokio::test]
async fn test_file_sink_without_config_block_fails_build() {
    let json = r#"{
        "aace.logger": {
            "sinks": [ { "id": "f", "type": "file", "rules": [{ "level": "Info" }] } ]
        }
    }"#;

    let config = RouterConfig::from_json_str(json).unwrap();
    let err = Router::build(config).await.unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSink { ref reason, .. } if reason.contains("config block")));
}

#[tokio::test]
async fn test_duplicate_sink_id_replaces_prior_entry() {
    use aace_log_router::domain::LogEvent;

    let dir = TempDir::new().unwrap();
    let config = RouterConfig::new()
        .file_sink_with("dup", Level::Verbose, dir.path(), "first", 1 << 20, 3, true)
        .file_sink_with("dup", Level::Verbose, dir.path(), "second", 1 << 20, 3, true);

    let router = Router::build(config).await.unwrap();
    router.dispatch(LogEvent::new(Level::Info, "core", "Engine", "one line"));
    router.shutdown().await;

    // Only the surviving registration ever opened a file.
    assert!(!dir.path().join("first").exists());
    let written = std::fs::read_to_string(dir.path().join("second")).unwrap();
    assert_eq!(written.lines().count(), 1);
}
