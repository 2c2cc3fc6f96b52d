use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::offload::DEFAULT_MAX_BLOCKING_CALLS;

/// Connection and paging settings for the GitHub provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    /// Items requested per page of a list endpoint (GitHub caps it at 100).
    pub per_page: u32,
    /// Capacity of the blocking worker pool.
    pub max_blocking_calls: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl GithubConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_PER_PAGE: u32 = 30;
    pub const MAX_PER_PAGE: u32 = 100;
    pub const DEFAULT_USER_AGENT: &'static str = "resux";

    /// `per_page` clamped to what the API accepts.
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn trace_loaded(&self) {
        info!(
            api_url = %self.api_url,
            per_page = self.page_size(),
            max_blocking_calls = self.max_blocking_calls,
            "Loaded GitHub config"
        );
        debug!(?self, "GitHub config loaded (full debug)");
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            per_page: Self::DEFAULT_PER_PAGE,
            max_blocking_calls: DEFAULT_MAX_BLOCKING_CALLS,
            timeout_seconds: 30,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        }
    }
}
