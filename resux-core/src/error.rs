//! Error taxonomy for the navigation core.
//!
//! Two layers:
//! - [`ProviderError`]: what the blocking provider client raises. These cross the
//!   worker boundary untouched.
//! - [`GitError`]: what consumers of [`crate::contract::Pagination`] and the facade
//!   observe. Provider faults are carried verbatim in [`GitError::Provider`];
//!   only key lookups translate the provider's not-found into
//!   [`GitError::NotFound`].
//!
//! Nothing in this crate logs an error it returns; callers decide.

use thiserror::Error;

/// Errors raised by a remote provider client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested singular resource does not exist on the provider.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Positional access past the end of a collection.
    #[error("index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Any other non-success answer (authentication, rate limiting, server faults).
    #[error("provider answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode provider payload: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

/// Errors surfaced by the pagination adapter and the repository facade.
#[derive(Debug, Error)]
pub enum GitError {
    /// A key lookup found no matching resource.
    #[error("no resource matches key {key:?}")]
    NotFound { key: String },

    /// String-keyed access on a collection that has no key lookup configured.
    #[error("collection does not support lookup by string key (got {key:?})")]
    UnsupportedKeyType { key: String },

    /// A provider fault, passed through unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The worker pool refused new blocking calls.
    #[error("blocking worker pool is closed")]
    WorkerPoolClosed,

    /// The blocking call was cancelled before completing (runtime shutdown).
    #[error("blocking call was cancelled")]
    WorkerCancelled,
}

impl GitError {
    /// Returns the underlying provider error, if this is a passthrough.
    pub fn provider(&self) -> Option<&ProviderError> {
        match self {
            GitError::Provider(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = GitError> = std::result::Result<T, E>;
