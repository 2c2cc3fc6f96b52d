//! # contract: provider-agnostic navigation interfaces
//!
//! Consumers (summarizers, CLI commands) only ever see the traits in this
//! module plus the read-only models in [`crate::model`]. Each hosting provider
//! supplies one implementation of [`Hub`], [`User`] and [`Repo`]; the GitHub one
//! lives in [`crate::github`]. Provider records never leak through these types.
//!
//! ## Collections
//! Every collection-valued property returns a fresh [`Pagination`] handle. It
//! supports:
//! - `length()`: provider-reported size (the first call may hit the network)
//! - `get(key)`: positional access or, where the collection allows it, lookup by
//!   identifier (commit SHA, `owner/name`, ...)
//! - `slice(start, stop)`: half-open range, `stop` exclusive
//! - `all()`: the whole collection
//! - `stream()`: lazy, single-pass iteration in provider order
//!
//! ## Errors
//! All operations return [`crate::error::Result`]. Provider faults are passed
//! through untouched in [`crate::error::GitError::Provider`].

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::model::{Commit, File, Tag};

/// Key for [`Pagination::get`]: a position or a provider identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Id(String),
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(id: &str) -> Self {
        Key::Id(id.to_string())
    }
}

impl From<String> for Key {
    fn from(id: String) -> Self {
        Key::Id(id)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "#{i}"),
            Key::Id(id) => f.write_str(id),
        }
    }
}

/// Asynchronous, uniformly indexable view over a provider collection.
#[async_trait]
pub trait Pagination<T: Send + 'static>: Send + Sync {
    /// Number of elements reported by the provider.
    async fn length(&self) -> Result<usize>;

    /// Element at a position, or the element identified by a string key.
    async fn get(&self, key: Key) -> Result<T>;

    /// Elements in `start..stop`. Empty when `start >= stop`.
    async fn slice(&self, start: usize, stop: usize) -> Result<Vec<T>>;

    /// Every element of the collection.
    async fn all(&self) -> Result<Vec<T>> {
        let len = self.length().await?;
        self.slice(0, len).await
    }

    /// Lazy single-pass stream. A failed fetch ends the stream with that error.
    fn stream(&self) -> BoxStream<'static, Result<T>>;
}

/// An account on the hosting provider.
pub trait User: Send + Sync {
    fn login(&self) -> &str;

    fn name(&self) -> Option<&str>;

    fn email(&self) -> Option<&str>;

    /// Repositories of this user. Accepts a bare repository name as key.
    fn repos(&self) -> Box<dyn Pagination<Box<dyn Repo>>>;
}

/// A hosted repository.
#[async_trait]
pub trait Repo: Send + Sync {
    fn owner(&self) -> Box<dyn User>;

    fn name(&self) -> &str;

    fn full_name(&self) -> &str;

    fn description(&self) -> Option<&str>;

    fn stars(&self) -> u64;

    /// The repository readme, or `None` when the repository has none.
    async fn readme(&self) -> Result<Option<File>>;

    /// Every file of the default branch, depth first.
    fn files(&self) -> BoxStream<'static, Result<File>>;

    /// Commit history, newest first. Accepts a commit SHA as key.
    fn commits(&self) -> Box<dyn Pagination<Commit>>;

    fn tags(&self) -> Box<dyn Pagination<Tag>>;

    /// Language name to number of bytes written in it.
    async fn languages(&self) -> Result<BTreeMap<String, u64>>;
}

/// Entry point to a hosting provider for one authenticated account.
#[async_trait]
pub trait Hub: Send + Sync {
    /// The authenticated user.
    async fn user(&self) -> Result<Box<dyn User>>;

    /// The authenticated account's own repositories (owned, collaborator and
    /// organization member), not all public repositories on the provider.
    /// Accepts `owner/name` as key, which resolves any repository visible to
    /// the account.
    fn repos(&self) -> Box<dyn Pagination<Box<dyn Repo>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_convert_from_indices_and_identifiers() {
        assert_eq!(Key::from(3), Key::Index(3));
        assert_eq!(Key::from("abc123"), Key::Id("abc123".to_string()));
        assert_eq!(Key::from("o/r".to_string()).to_string(), "o/r");
        assert_eq!(Key::Index(7).to_string(), "#7");
    }
}
