//! Raw GitHub REST records.
//!
//! Only the fields the domain models read are declared; everything else in the
//! payload is ignored. These types never cross the [`crate::contract`]
//! boundary.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `GET /user`, `GET /users/{login}`, and the `owner` of a repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRepository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub owner: RawUser,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawGitAuthor {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawGitCommit {
    pub message: String,
    pub author: RawGitAuthor,
}

/// An entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCommit {
    pub sha: String,
    pub commit: RawGitCommit,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTag {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// A file or directory entry from the contents API, with file bodies already
/// base64-decoded by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RawContent {
    pub path: String,
    pub kind: ContentKind,
    pub content: Vec<u8>,
}

/// Wire form of a contents entry, before decoding.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireContent {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    pub items: Vec<Value>,
    /// Page number from the `rel="next"` link, if any.
    pub next_page: Option<u32>,
    /// Page number from the `rel="last"` link, if any.
    pub last_page: Option<u32>,
}
