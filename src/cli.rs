///
/// This module implements the CLI interface for resux: command parsing, the
/// async entrypoint, and JSON output.
///
/// All navigation logic (pagination, domain models, the GitHub facade) lives in
/// the [`resux-core`] crate. This module only loads configuration, connects a
/// hub, and renders results.
///
/// ## Features
/// - Entry struct [`Cli`] with a global `--config` option and the subcommands
///   in [`Commands`].
/// - [`run`] for `main()` and integration tests; [`execute`] to run a command
///   against any [`Hub`] (tests pass a mocked one).
/// - Results are printed as pretty JSON on stdout; logs go to stderr.
///
/// [`resux-core`]: ../../resux-core/
use crate::inspect::{inspect, resolve_repo};
use crate::load_config::{load_config, InspectSection};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use resux_core::github::Github;
use resux_core::{File, Hub};
use serde_json::{json, Value};
use std::path::PathBuf;

/// CLI for resux: browse hosted git repositories as JSON.
#[derive(Parser, Debug)]
#[clap(
    name = "resux",
    version,
    about = "Inspect GitHub users, repositories, files, commits and tags"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Show the authenticated user
    Whoami,
    /// List the repositories visible to the authenticated user
    Repos,
    /// List every file of a repository (`owner/name` or a bare name)
    Files { repo: String },
    /// List commits of a repository, newest first
    Commits {
        repo: String,
        /// Number of commits to skip
        #[clap(long, default_value_t = 0)]
        offset: usize,
        /// Maximum number of commits to list
        #[clap(long, default_value_t = 30)]
        limit: usize,
    },
    /// List tags of a repository
    Tags { repo: String },
    /// Summarise one or more repositories
    Inspect {
        #[clap(required = true)]
        repos: Vec<String>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Whoami => "whoami",
            Commands::Repos => "repos",
            Commands::Files { .. } => "files",
            Commands::Commits { .. } => "commits",
            Commands::Tags { .. } => "tags",
            Commands::Inspect { .. } => "inspect",
        }
    }
}

fn file_entry(file: &File) -> Value {
    json!({ "path": file.path(), "size": file.content().len() })
}

/// Runs `command` against `hub` and returns the JSON document to print.
pub async fn execute(hub: &dyn Hub, command: &Commands, settings: &InspectSection) -> Result<Value> {
    let value = match command {
        Commands::Whoami => {
            let user = hub.user().await.context("Failed to fetch the authenticated user")?;
            json!({ "login": user.login(), "name": user.name(), "email": user.email() })
        }
        Commands::Repos => {
            let repos = hub.repos().all().await.context("Failed to list repositories")?;
            Value::Array(
                repos
                    .iter()
                    .map(|r| {
                        json!({
                            "full_name": r.full_name(),
                            "description": r.description(),
                            "stars": r.stars(),
                        })
                    })
                    .collect(),
            )
        }
        Commands::Files { repo } => {
            let repo = resolve_repo(hub, repo).await?;
            let files: Vec<File> = repo
                .files()
                .try_collect()
                .await
                .with_context(|| format!("Failed to walk files of {}", repo.full_name()))?;
            Value::Array(files.iter().map(file_entry).collect())
        }
        Commands::Commits { repo, offset, limit } => {
            let repo = resolve_repo(hub, repo).await?;
            let commits = repo
                .commits()
                .slice(*offset, offset.saturating_add(*limit))
                .await
                .with_context(|| format!("Failed to list commits of {}", repo.full_name()))?;
            serde_json::to_value(commits)?
        }
        Commands::Tags { repo } => {
            let repo = resolve_repo(hub, repo).await?;
            let tags = repo
                .tags()
                .all()
                .await
                .with_context(|| format!("Failed to list tags of {}", repo.full_name()))?;
            serde_json::to_value(tags)?
        }
        Commands::Inspect { repos } => serde_json::to_value(inspect(hub, repos, settings).await?)?,
    };
    Ok(value)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref())?;
    let hub = Github::connect(&config.github, &config.token)
        .await
        .context("Failed to set up the GitHub client")?;

    let command = cli.command.name();
    tracing::info!(command, "Dispatching command");
    let value = execute(&hub, &cli.command, &config.inspect).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    tracing::info!(command, "Command complete");
    Ok(())
}
