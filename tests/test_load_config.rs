use resux::load_config::{load_config, InspectSection, TOKEN_ENV};
use resux_core::config::GithubConfig;
use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

#[test]
#[serial]
fn test_load_config_reads_both_sections() {
    let file = config_file(
        r#"
github:
  api_url: https://github.example.com/api/v3
  per_page: 100
  max_blocking_calls: 4
inspect:
  concurrency: 2
  commits: 5
"#,
    );
    env::set_var(TOKEN_ENV, "ghp_test");

    let config = load_config(Some(file.path())).expect("Config should load");

    assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
    assert_eq!(config.github.page_size(), 100);
    assert_eq!(config.github.max_blocking_calls, 4);
    assert_eq!(config.github.user_agent, GithubConfig::DEFAULT_USER_AGENT);
    assert_eq!(
        config.inspect,
        InspectSection {
            concurrency: 2,
            commits: 5
        }
    );
    assert_eq!(config.token, "ghp_test");
}

#[test]
#[serial]
fn test_load_config_defaults_without_file() {
    env::set_var(TOKEN_ENV, "ghp_test");

    let config = load_config(None).expect("Defaults should load");

    assert_eq!(config.github, GithubConfig::default());
    assert_eq!(config.inspect, InspectSection::default());
}

#[test]
#[serial]
fn test_load_config_accepts_an_empty_file() {
    let file = config_file("");
    env::set_var(TOKEN_ENV, "ghp_test");

    let config = load_config(Some(file.path())).expect("Empty file means defaults");
    assert_eq!(config.github, GithubConfig::default());
}

#[test]
#[serial]
fn test_load_config_errors_without_token() {
    let file = config_file("inspect:\n  concurrency: 8\n");
    env::remove_var(TOKEN_ENV);

    let err = load_config(Some(file.path())).expect_err("token is required");
    assert!(err.to_string().contains(TOKEN_ENV));
}

#[test]
#[serial]
fn test_load_config_errors_on_invalid_yaml() {
    let file = config_file("github: [this is not a mapping\n");
    env::set_var(TOKEN_ENV, "ghp_test");

    let err = load_config(Some(file.path())).expect_err("invalid YAML");
    assert!(err.to_string().contains("Failed to parse config YAML"));
}

#[test]
#[serial]
fn test_load_config_errors_on_wrong_field_type() {
    let file = config_file("github:\n  per_page: lots\n");
    env::set_var(TOKEN_ENV, "ghp_test");

    assert!(load_config(Some(file.path())).is_err());
}
