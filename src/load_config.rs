/// `load_config` module: reads the optional YAML settings file and injects the
/// GitHub token from the environment.
///
/// # Responsibilities
/// - Parse the `github` and `inspect` sections into typed structs, defaulting
///   every field that is absent (an absent file means all defaults).
/// - Read the access token from `GITHUB_ACCESS_TOKEN`. Tokens are never read
///   from YAML.
/// - Log what was loaded; return `anyhow` errors with the offending path.
use anyhow::{anyhow, Result};
use resux_core::config::GithubConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable holding the GitHub access token.
pub const TOKEN_ENV: &str = "GITHUB_ACCESS_TOKEN";

/// Settings for the `inspect` command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InspectSection {
    /// Repositories inspected at the same time.
    pub concurrency: usize,
    /// Recent commits collected per repository.
    pub commits: usize,
}

impl Default for InspectSection {
    fn default() -> Self {
        Self {
            concurrency: 4,
            commits: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub github: GithubConfig,
    pub inspect: InspectSection,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub github: GithubConfig,
    pub inspect: InspectSection,
    pub token: String,
}

/// Loads the YAML file at `path` (or defaults when `None`) and the token from
/// the environment.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let file = match path {
        Some(path) => read_file_config(path)?,
        None => {
            info!("No config file given, using defaults");
            FileConfig::default()
        }
    };

    let token = match env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            error!(env = TOKEN_ENV, "GitHub access token missing from environment");
            return Err(anyhow!("{TOKEN_ENV} must be set to a GitHub access token"));
        }
    };

    file.github.trace_loaded();
    Ok(CliConfig {
        github: file.github,
        inspect: file.inspect,
        token,
    })
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow!("Failed to read config file {:?}: {}", path, e));
        }
    };

    // An empty file parses as YAML null.
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(config) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow!("Failed to parse config YAML {:?}: {e}", path))
        }
    }
}
