//! # github: the GitHub implementation of the navigation contract
//!
//! Layers, bottom up:
//! - [`GithubApi`]: the blocking provider client surface. [`GithubClient`] is the
//!   real REST implementation; tests use the generated `MockGithubApi`.
//! - [`PaginatedList`]: a GitHub list endpoint as a [`crate::pagination::RawCollection`].
//! - [`convert`]: pure record-to-model mapping.
//! - [`Github`], [`GithubUser`], [`GithubRepo`]: the [`Hub`], [`crate::contract::User`]
//!   and [`crate::contract::Repo`] implementations.
//!
//! Every call into [`GithubApi`] goes through the shared [`Offloader`]; nothing in
//! this module blocks an async task.
//!
//! ## Mocking & Testing
//! [`GithubApi`] is annotated for `mockall`. Build a hub over a mock with
//! [`Github::new`] to exercise the facade without a network.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, info};

pub mod client;
pub mod convert;
pub mod pagination;
pub mod repo;
pub mod types;

pub use client::GithubClient;
pub use pagination::PaginatedList;
pub use repo::{GithubRepo, GithubUser};
pub use types::{ContentKind, RawCommit, RawContent, RawPage, RawRepository, RawTag, RawUser};

use crate::config::GithubConfig;
use crate::contract::{Hub, Pagination, Repo, User};
use crate::error::{ProviderError, Result};
use crate::offload::Offloader;
use crate::pagination::PaginationAdapter;

/// Blocking GitHub REST surface used by the facade.
///
/// Every method may perform network I/O. A missing resource is reported as
/// [`ProviderError::NotFound`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait GithubApi: Send + Sync {
    /// `GET /user`
    fn authenticated_user(&self) -> std::result::Result<RawUser, ProviderError>;

    /// `GET /repos/{full_name}`
    fn repository(&self, full_name: &str) -> std::result::Result<RawRepository, ProviderError>;

    /// `GET /repos/{full_name}/commits/{sha}`
    fn commit(&self, full_name: &str, sha: &str) -> std::result::Result<RawCommit, ProviderError>;

    /// `GET /repos/{full_name}/readme`, body decoded.
    fn readme(&self, full_name: &str) -> std::result::Result<RawContent, ProviderError>;

    /// Entries of one directory (`""` for the root), file bodies decoded.
    fn dir_contents(
        &self,
        full_name: &str,
        path: &str,
    ) -> std::result::Result<Vec<RawContent>, ProviderError>;

    /// `GET /repos/{full_name}/languages`
    fn languages(&self, full_name: &str)
        -> std::result::Result<BTreeMap<String, u64>, ProviderError>;

    /// One page (1-based) of a list endpoint such as `user/repos`.
    fn page(
        &self,
        path: &str,
        number: u32,
        per_page: u32,
    ) -> std::result::Result<RawPage, ProviderError>;
}

/// What every GitHub facade object carries: the client, the worker pool and
/// the page size for list endpoints.
#[derive(Clone)]
pub(crate) struct Context {
    pub api: Arc<dyn GithubApi>,
    pub offloader: Offloader,
    pub per_page: u32,
}

impl Context {
    /// Adapter over the repository list at `path`, keyed by whatever `lookup`
    /// resolves.
    pub fn repo_list<L>(&self, path: String, lookup: L) -> Box<dyn Pagination<Box<dyn Repo>>>
    where
        L: Fn(&dyn GithubApi, &str) -> std::result::Result<RawRepository, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        let api = Arc::clone(&self.api);
        let per_page = self.per_page;
        let ctx = self.clone();
        let lookup_api = Arc::clone(&self.api);

        PaginationAdapter::new(
            self.offloader.clone(),
            move || Ok(PaginatedList::new(Arc::clone(&api), path.clone(), per_page)),
            move |raw: RawRepository| -> Box<dyn Repo> { Box::new(GithubRepo::new(raw, ctx.clone())) },
        )
        .with_lookup(move |key: &str| lookup(lookup_api.as_ref(), key))
        .boxed()
    }
}

/// GitHub hub for one authenticated account.
#[derive(Clone)]
pub struct Github {
    ctx: Context,
}

impl Github {
    /// Hub over an already built client.
    pub fn new(api: Arc<dyn GithubApi>, offloader: Offloader, per_page: u32) -> Self {
        Self {
            ctx: Context {
                api,
                offloader,
                per_page: per_page.clamp(1, GithubConfig::MAX_PER_PAGE),
            },
        }
    }

    /// Builds a [`GithubClient`] on the worker pool and wraps it in a hub.
    pub async fn connect(config: &GithubConfig, token: &str) -> Result<Self> {
        let offloader = Offloader::new(config.max_blocking_calls);
        let client_config = config.clone();
        let token = token.to_string();
        let client = offloader
            .run(move || GithubClient::new(&client_config, &token))
            .await??;
        info!(api_url = %config.api_url, "Connected GitHub hub");
        Ok(Self::new(Arc::new(client), offloader, config.page_size()))
    }

    pub fn offloader(&self) -> &Offloader {
        &self.ctx.offloader
    }
}

#[async_trait]
impl Hub for Github {
    async fn user(&self) -> Result<Box<dyn User>> {
        let api = Arc::clone(&self.ctx.api);
        let raw = self
            .ctx
            .offloader
            .run(move || api.authenticated_user())
            .await??;
        debug!(login = %raw.login, "authenticated user resolved");
        Ok(Box::new(GithubUser::authenticated(raw, self.ctx.clone())))
    }

    fn repos(&self) -> Box<dyn Pagination<Box<dyn Repo>>> {
        self.ctx
            .repo_list("user/repos".to_string(), |api, full_name| api.repository(full_name))
    }
}
