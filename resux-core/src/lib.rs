#![doc = "resux-core: asynchronous navigation over hosted git repositories."]

//! This crate turns a blocking, paginated hosting-provider client into an
//! async, provider-agnostic view of users, repositories, commits, tags and files.
//!
//! - [`contract`]: the traits consumers program against ([`Hub`], [`User`], [`Repo`], [`Pagination`]).
//! - [`model`]: read-only domain values.
//! - [`pagination`]: the adapter turning any [`pagination::RawCollection`] into a [`Pagination`].
//! - [`offload`]: the bounded worker pool every blocking call runs on.
//! - [`github`]: the GitHub implementation.
//!
//! # Usage
//! Connect with [`github::Github::connect`] and navigate through [`Hub`].

pub mod config;
pub mod contract;
pub mod error;
pub mod github;
pub mod model;
pub mod offload;
pub mod pagination;
#[cfg(any(test, feature = "test-export-mocks"))]
pub mod testing;

pub use contract::{Hub, Key, Pagination, Repo, User};
pub use error::{GitError, ProviderError, Result};
pub use model::{Commit, CommitAuthor, File, Tag};
