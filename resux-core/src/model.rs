//! Read-only domain models produced by the provider mapping functions.
//!
//! These are plain values: created fresh on every mapping, never deduplicated,
//! and holding nothing but fields the provider record already carried.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitAuthor {
    name: String,
    email: String,
}

impl CommitAuthor {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    sha: String,
    message: String,
    author: CommitAuthor,
    author_date: DateTime<Utc>,
}

impl Commit {
    pub fn new(
        sha: impl Into<String>,
        message: impl Into<String>,
        author: CommitAuthor,
        author_date: DateTime<Utc>,
    ) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author,
            author_date,
        }
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn author(&self) -> &CommitAuthor {
        &self.author
    }

    pub fn author_date(&self) -> DateTime<Utc> {
        self.author_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A file of a repository with its full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: String,
    content: Vec<u8>,
}

impl File {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Path relative to the repository root, `/`-separated.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}
