//! Blocking GitHub REST client.
//!
//! Every method here blocks the calling thread on network I/O; the facade only
//! calls them from the worker pool. Build the client with
//! [`GithubClient::new`] from a blocking context too (see
//! [`crate::github::Github::connect`]).

use std::collections::BTreeMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use super::types::{
    ContentKind, RawCommit, RawContent, RawPage, RawRepository, RawUser, WireContent,
};
use super::GithubApi;
use crate::config::GithubConfig;
use crate::error::ProviderError;

const API_VERSION: &str = "2022-11-28";

/// Page numbers announced by GitHub's `Link` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkPagination {
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Parses `<...?page=2>; rel="next", <...?page=5>; rel="last"`.
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        let page = url.and_then(page_from_url);
        match (rel, page) {
            (Some("next"), Some(page)) => info.next_page = Some(page),
            (Some("last"), Some(page)) => info.last_page = Some(page),
            _ => {}
        }
    }

    info
}

fn page_from_url(url: &str) -> Option<u32> {
    let query = &url[url.find('?')? + 1..];
    query
        .split('&')
        .find_map(|param| param.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
}

/// Decodes the base64 body of a contents entry. GitHub wraps the encoding at
/// 60 columns, so whitespace is stripped first.
pub(crate) fn decode_content(wire: WireContent) -> Result<RawContent, ProviderError> {
    let content = match (wire.content, wire.encoding.as_deref()) {
        (Some(body), Some("base64")) => {
            let compact: String = body.split_whitespace().collect();
            STANDARD
                .decode(compact)
                .map_err(|e| ProviderError::Decode(format!("{}: {e}", wire.path)))?
        }
        (Some(body), None) => body.into_bytes(),
        // Bodies over 1 MB come back with encoding "none" and no content.
        _ => Vec::new(),
    };
    Ok(RawContent {
        path: wire.path,
        kind: wire.kind,
        content,
    })
}

/// Error for a non-success answer to `GET path`. 404 is a missing resource;
/// anything else carries GitHub's JSON `message`, or the raw body.
pub(crate) fn status_error(status: StatusCode, path: &str, body: &str) -> ProviderError {
    if status == StatusCode::NOT_FOUND {
        return ProviderError::NotFound {
            resource: path.to_string(),
        };
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string());
    ProviderError::Status {
        status: status.as_u16(),
        message,
    }
}

pub struct GithubClient {
    http: Client,
    api_url: Url,
}

impl GithubClient {
    /// Builds the HTTP client. Blocking: do not call from an async task.
    pub fn new(config: &GithubConfig, token: &str) -> Result<Self, ProviderError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ProviderError::InvalidRequest(format!("{}: {e}", config.api_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ProviderError::InvalidRequest("token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        debug!(api_url = %api_url, "GitHub client ready");
        Ok(Self { http, api_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidRequest(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ProviderError> {
        let url = self.endpoint(path)?;
        trace!(%url, ?query, "GET");
        let response = self.http.get(url).query(query).send()?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "GitHub answered");

        if !status.is_success() {
            let body = if status == StatusCode::NOT_FOUND {
                String::new()
            } else {
                response.text().unwrap_or_default()
            };
            return Err(status_error(status, path, &body));
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let body = self.send(path, &[])?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn content(&self, path: &str) -> Result<RawContent, ProviderError> {
        decode_content(self.get_json(path)?)
    }
}

fn contents_path(full_name: &str, path: &str) -> String {
    if path.is_empty() {
        format!("repos/{full_name}/contents")
    } else {
        format!("repos/{full_name}/contents/{path}")
    }
}

impl GithubApi for GithubClient {
    #[instrument(skip(self), level = "debug")]
    fn authenticated_user(&self) -> Result<RawUser, ProviderError> {
        self.get_json("user")
    }

    #[instrument(skip(self), level = "debug")]
    fn repository(&self, full_name: &str) -> Result<RawRepository, ProviderError> {
        self.get_json(&format!("repos/{full_name}"))
    }

    #[instrument(skip(self), level = "debug")]
    fn commit(&self, full_name: &str, sha: &str) -> Result<RawCommit, ProviderError> {
        self.get_json(&format!("repos/{full_name}/commits/{sha}"))
    }

    #[instrument(skip(self), level = "debug")]
    fn readme(&self, full_name: &str) -> Result<RawContent, ProviderError> {
        self.content(&format!("repos/{full_name}/readme"))
    }

    #[instrument(skip(self), level = "debug")]
    fn dir_contents(&self, full_name: &str, path: &str) -> Result<Vec<RawContent>, ProviderError> {
        let listing: Vec<WireContent> = self.get_json(&contents_path(full_name, path))?;
        listing
            .into_iter()
            .map(|entry| match entry.kind {
                ContentKind::File => self.content(&contents_path(full_name, &entry.path)),
                _ => decode_content(entry),
            })
            .collect()
    }

    #[instrument(skip(self), level = "debug")]
    fn languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>, ProviderError> {
        self.get_json(&format!("repos/{full_name}/languages"))
    }

    #[instrument(skip(self), level = "debug")]
    fn page(&self, path: &str, number: u32, per_page: u32) -> Result<RawPage, ProviderError> {
        let response = self.send(
            path,
            &[("page", number.to_string()), ("per_page", per_page.to_string())],
        )?;
        let links = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default();
        let items: Vec<Value> = serde_json::from_str(&response.text()?)?;
        trace!(items = items.len(), ?links, "page fetched");

        Ok(RawPage {
            items,
            next_page: links.next_page,
            last_page: links.last_page,
        })
    }
}
