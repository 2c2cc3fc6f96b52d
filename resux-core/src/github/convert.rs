//! Pure mapping from GitHub records to domain models. No I/O happens here.

use super::types::{RawCommit, RawContent, RawTag};
use crate::model::{Commit, CommitAuthor, File, Tag};

pub fn to_commit(raw: RawCommit) -> Commit {
    let author = raw.commit.author;
    Commit::new(
        raw.sha,
        raw.commit.message,
        CommitAuthor::new(author.name, author.email),
        author.date,
    )
}

pub fn to_tag(raw: RawTag) -> Tag {
    Tag::new(raw.name)
}

pub fn to_file(raw: RawContent) -> File {
    File::new(raw.path, raw.content)
}
