//! GitHub [`User`] and [`Repo`] facades.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use super::convert::{to_commit, to_file, to_tag};
use super::types::{ContentKind, RawCommit, RawRepository, RawTag, RawUser};
use super::{Context, PaginatedList};
use crate::contract::{Pagination, Repo, User};
use crate::error::{GitError, Result};
use crate::model::{Commit, File, Tag};
use crate::pagination::PaginationAdapter;

pub struct GithubUser {
    raw: RawUser,
    authenticated: bool,
    ctx: Context,
}

impl GithubUser {
    pub(crate) fn authenticated(raw: RawUser, ctx: Context) -> Self {
        Self {
            raw,
            authenticated: true,
            ctx,
        }
    }

    pub(crate) fn named(raw: RawUser, ctx: Context) -> Self {
        Self {
            raw,
            authenticated: false,
            ctx,
        }
    }

    /// List endpoint for this user's repositories. The authenticated account
    /// also sees its private ones.
    fn repos_path(&self) -> String {
        if self.authenticated {
            "user/repos".to_string()
        } else {
            format!("users/{}/repos", self.raw.login)
        }
    }
}

impl User for GithubUser {
    fn login(&self) -> &str {
        &self.raw.login
    }

    fn name(&self) -> Option<&str> {
        self.raw.name.as_deref()
    }

    fn email(&self) -> Option<&str> {
        self.raw.email.as_deref()
    }

    fn repos(&self) -> Box<dyn Pagination<Box<dyn Repo>>> {
        let login = self.raw.login.clone();
        self.ctx.repo_list(self.repos_path(), move |api, name| {
            api.repository(&format!("{login}/{name}"))
        })
    }
}

pub struct GithubRepo {
    raw: Arc<RawRepository>,
    ctx: Context,
}

impl GithubRepo {
    pub(crate) fn new(raw: RawRepository, ctx: Context) -> Self {
        Self {
            raw: Arc::new(raw),
            ctx,
        }
    }

    fn list_path(&self, endpoint: &str) -> String {
        format!("repos/{}/{endpoint}", self.raw.full_name)
    }
}

/// Depth-first walk state: directories still to list, and files of the last
/// listed directory not yet handed out.
struct Walk {
    pending: Vec<String>,
    ready: VecDeque<File>,
}

#[async_trait]
impl Repo for GithubRepo {
    fn owner(&self) -> Box<dyn User> {
        Box::new(GithubUser::named(self.raw.owner.clone(), self.ctx.clone()))
    }

    fn name(&self) -> &str {
        &self.raw.name
    }

    fn full_name(&self) -> &str {
        &self.raw.full_name
    }

    fn description(&self) -> Option<&str> {
        self.raw.description.as_deref()
    }

    fn stars(&self) -> u64 {
        self.raw.stargazers_count
    }

    async fn readme(&self) -> Result<Option<File>> {
        let api = Arc::clone(&self.ctx.api);
        let full_name = self.raw.full_name.clone();
        match self.ctx.offloader.run(move || api.readme(&full_name)).await? {
            Ok(raw) => Ok(Some(to_file(raw))),
            Err(e) if e.is_not_found() => {
                debug!(repo = %self.raw.full_name, "no readme");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn files(&self) -> BoxStream<'static, Result<File>> {
        let ctx = self.ctx.clone();
        let full_name = self.raw.full_name.clone();
        let start = Walk {
            pending: vec![String::new()],
            ready: VecDeque::new(),
        };

        stream::try_unfold(start, move |mut walk| {
            let ctx = ctx.clone();
            let full_name = full_name.clone();
            async move {
                loop {
                    if let Some(file) = walk.ready.pop_front() {
                        return Ok::<_, GitError>(Some((file, walk)));
                    }
                    let Some(dir) = walk.pending.pop() else {
                        return Ok(None);
                    };
                    let api = Arc::clone(&ctx.api);
                    let full_name = full_name.clone();
                    let entries = ctx
                        .offloader
                        .run(move || api.dir_contents(&full_name, &dir))
                        .await??;
                    for entry in entries {
                        match entry.kind {
                            ContentKind::Dir => walk.pending.push(entry.path),
                            ContentKind::File => walk.ready.push_back(to_file(entry)),
                            ContentKind::Symlink | ContentKind::Submodule => {}
                        }
                    }
                }
            }
        })
        .boxed()
    }

    fn commits(&self) -> Box<dyn Pagination<Commit>> {
        let api = Arc::clone(&self.ctx.api);
        let lookup_api = Arc::clone(&self.ctx.api);
        let path = self.list_path("commits");
        let full_name = self.raw.full_name.clone();
        let per_page = self.ctx.per_page;

        PaginationAdapter::new(
            self.ctx.offloader.clone(),
            move || Ok(PaginatedList::<RawCommit>::new(Arc::clone(&api), path.clone(), per_page)),
            to_commit,
        )
        .with_lookup(move |sha: &str| lookup_api.commit(&full_name, sha))
        .boxed()
    }

    fn tags(&self) -> Box<dyn Pagination<Tag>> {
        let api = Arc::clone(&self.ctx.api);
        let path = self.list_path("tags");
        let per_page = self.ctx.per_page;

        PaginationAdapter::new(
            self.ctx.offloader.clone(),
            move || Ok(PaginatedList::<RawTag>::new(Arc::clone(&api), path.clone(), per_page)),
            to_tag,
        )
        .boxed()
    }

    async fn languages(&self) -> Result<BTreeMap<String, u64>> {
        let api = Arc::clone(&self.ctx.api);
        let full_name = self.raw.full_name.clone();
        Ok(self
            .ctx
            .offloader
            .run(move || api.languages(&full_name))
            .await??)
    }
}
