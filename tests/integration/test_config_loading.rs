use shortcut_source::core::config::loader::CONFIG_FILE_NAME;
use shortcut_source::core::config::{ConfigLoader, ConfigValidator};
use shortcut_source::core::fetcher::RelayTemplate;
use shortcut_source::core::types::OutputFormat;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_scsource_env() {
    for v in &[
        "SCSOURCE_RELAYS",
        "SCSOURCE_DIRECT_FIRST",
        "SCSOURCE_TIMEOUT_SECONDS",
        "SCSOURCE_RETAIN_DOWNLOAD_PAYLOAD",
        "SCSOURCE_DEFAULT_FORMAT",
        "SCSOURCE_BIND",
        "SCSOURCE_ENABLE_CORS",
        "SCSOURCE_ALLOWED_ORIGINS",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_file_values_are_loaded() {
    clear_scsource_env();
    let temp_dir = TempDir::new().unwrap();

    let config_content = r#"
[fetcher]
relays = ["https://relay-a.example/?u={target}", "https://relay-b.example/fetch/"]
direct_first = true
timeout_seconds = 15

[metadata]
path_segment = "icloud.com/shortcuts/"
records_segment = "icloud.com/shortcuts/api/records/"

[normalizer]
retain_download_payload = false
preview_chars = 40

[output]
default_format = "xml"

[server]
bind = "127.0.0.1:8080"
enable_cors = true
allowed_origins = ["https://app.example.com"]
"#;
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();

    assert_eq!(
        config.fetcher.relays,
        vec![
            RelayTemplate::new("https://relay-a.example/?u={target}"),
            RelayTemplate::new("https://relay-b.example/fetch/"),
        ]
    );
    assert!(config.fetcher.direct_first);
    assert_eq!(config.fetcher.timeout_seconds, Some(15));
    assert!(!config.normalizer.retain_download_payload);
    assert_eq!(config.normalizer.preview_chars, 40);
    assert_eq!(config.output.default_format, OutputFormat::Xml);
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.server.allowed_origins, vec!["https://app.example.com"]);
    assert!(ConfigValidator::validate(&config).is_ok());
}

#[test]
#[serial]
fn test_partial_config_uses_defaults() {
    clear_scsource_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[output]\ndefault_format = \"xml\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();

    assert_eq!(config.output.default_format, OutputFormat::Xml);
    assert_eq!(config.fetcher.relays.len(), 4);
    assert_eq!(
        config.fetcher.relays[0],
        RelayTemplate::new("https://corsproxy.io/?{target}")
    );
    assert!(config.normalizer.retain_download_payload);
    assert_eq!(config.normalizer.preview_chars, 100);
    assert_eq!(config.server.bind, "0.0.0.0:3333");
    assert!(config.server.enable_cors);
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_scsource_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[fetcher]\ndirect_first = false\n\n[server]\nbind = \"127.0.0.1:9000\"\n",
    )
    .unwrap();

    env::set_var("SCSOURCE_RELAYS", "https://one.example/?{target}, ,https://two.example/");
    env::set_var("SCSOURCE_DIRECT_FIRST", "true");
    env::set_var("SCSOURCE_TIMEOUT_SECONDS", "7");
    env::set_var("SCSOURCE_RETAIN_DOWNLOAD_PAYLOAD", "false");
    env::set_var("SCSOURCE_DEFAULT_FORMAT", "XML");
    env::set_var("SCSOURCE_BIND", "127.0.0.1:4444");
    env::set_var("SCSOURCE_ENABLE_CORS", "false");
    env::set_var("SCSOURCE_ALLOWED_ORIGINS", "https://a.example, https://b.example");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    clear_scsource_env();

    assert_eq!(
        config.fetcher.relays,
        vec![
            RelayTemplate::new("https://one.example/?{target}"),
            RelayTemplate::new("https://two.example/"),
        ]
    );
    assert!(config.fetcher.direct_first);
    assert_eq!(config.fetcher.timeout_seconds, Some(7));
    assert!(!config.normalizer.retain_download_payload);
    assert_eq!(config.output.default_format, OutputFormat::Xml);
    assert_eq!(config.server.bind, "127.0.0.1:4444");
    assert!(!config.server.enable_cors);
    assert_eq!(
        config.server.allowed_origins,
        vec!["https://a.example", "https://b.example"]
    );
}

#[test]
#[serial]
fn test_env_overrides_without_config_file() {
    clear_scsource_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("SCSOURCE_BIND", "127.0.0.1:5555");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    clear_scsource_env();

    assert_eq!(config.server.bind, "127.0.0.1:5555");
    assert_eq!(config.fetcher.relays.len(), 4);
}

#[test]
#[serial]
fn test_invalid_relay_is_rejected_by_validation() {
    clear_scsource_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[fetcher]\nrelays = [\"not a url {target}\"]\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    let err = ConfigValidator::validate(&config).unwrap_err();
    assert!(err.message.contains("invalid relay template"));
}

#[test]
#[serial]
fn test_unknown_format_in_file_is_a_parse_error() {
    clear_scsource_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[output]\ndefault_format = \"yaml\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "CONFIG-PARSE-001");
}
