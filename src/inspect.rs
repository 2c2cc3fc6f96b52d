//! # inspect: gather the facts about a set of repositories
//!
//! For each requested repository, the readme, languages, tags and most recent
//! commits are fetched concurrently. Repositories themselves are inspected with
//! bounded fan-out ([`InspectSection::concurrency`]); results keep the order
//! the names were given in.
//!
//! Names containing a `/` are resolved as `owner/name` through the hub; bare
//! names are resolved against the authenticated user's repositories.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use resux_core::{Commit, Hub, Key, Repo};
use serde::Serialize;
use tracing::{debug, info};

use crate::load_config::InspectSection;

/// Everything `inspect` reports about one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepoFacts {
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub languages: BTreeMap<String, u64>,
    pub tags: Vec<String>,
    pub has_readme: bool,
    pub recent_commits: Vec<Commit>,
}

/// Resolves `name` to a repository: `owner/name` through the hub, a bare name
/// through the authenticated user.
pub async fn resolve_repo(hub: &dyn Hub, name: &str) -> Result<Box<dyn Repo>> {
    let repo = if name.contains('/') {
        hub.repos().get(Key::from(name)).await
    } else {
        let user = hub.user().await.context("Failed to resolve the authenticated user")?;
        user.repos().get(Key::from(name)).await
    };
    repo.with_context(|| format!("Repository {name:?} could not be resolved"))
}

pub async fn facts(repo: &dyn Repo, commits: usize) -> Result<RepoFacts> {
    let commit_list = repo.commits();
    let tag_list = repo.tags();
    let (readme, languages, tags, recent_commits) = futures::try_join!(
        repo.readme(),
        repo.languages(),
        tag_list.all(),
        commit_list.slice(0, commits),
    )
    .with_context(|| format!("Failed to inspect {}", repo.full_name()))?;

    debug!(
        repo = repo.full_name(),
        tags = tags.len(),
        commits = recent_commits.len(),
        "repository inspected"
    );
    Ok(RepoFacts {
        full_name: repo.full_name().to_string(),
        description: repo.description().map(str::to_string),
        stars: repo.stars(),
        languages,
        tags: tags.iter().map(|t| t.name().to_string()).collect(),
        has_readme: readme.is_some(),
        recent_commits,
    })
}

/// Inspects every repository in `names`, at most `settings.concurrency` at a time.
pub async fn inspect(
    hub: &dyn Hub,
    names: &[String],
    settings: &InspectSection,
) -> Result<Vec<RepoFacts>> {
    let fan_out = settings.concurrency.max(1);
    info!(repos = names.len(), fan_out, "Inspecting repositories");

    let mut indexed: Vec<(usize, RepoFacts)> = stream::iter(names.iter().enumerate())
        .map(|(position, name)| async move {
            let repo = resolve_repo(hub, name).await?;
            let facts = facts(repo.as_ref(), settings.commits).await?;
            Ok::<_, anyhow::Error>((position, facts))
        })
        .buffer_unordered(fan_out)
        .try_collect()
        .await?;

    indexed.sort_by_key(|(position, _)| *position);
    Ok(indexed.into_iter().map(|(_, facts)| facts).collect())
}
