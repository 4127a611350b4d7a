//! GitHub API client
//!
//! Issues authenticated GET requests against the REST API with a timeout and bounded retry.

use super::pages::Pages;
use super::resilient_http::{RetryPolicy, resilient_get};
use crate::Result;
use bytes::Bytes;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

const LOG_TARGET: &str = "    github";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const DEFAULT_PAGE_SIZE: u8 = 100;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection parameters for the API client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL that relative endpoint paths are joined to
    pub base_url: String,

    /// Page-size hint sent with paginated requests
    pub page_size: u8,

    /// Timeout for each individual request
    pub request_timeout: Duration,

    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl Client {
    /// Create a client that authenticates every request with `token`
    pub fn new(token: &str, settings: ClientSettings) -> Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("Bearer {token}")).into_app_err("access token contains invalid characters")?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("github-traffic-collector/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self { client, settings })
    }

    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Resolve an endpoint to a full URL.
    ///
    /// Absolute URLs (such as pagination cursors) are used verbatim, anything else is treated as a path
    /// relative to the configured base URL.
    #[must_use]
    pub fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            return path_or_url.to_string();
        }

        let base = self.settings.base_url.trim_end_matches('/');
        let path = path_or_url.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Resolve an endpoint and append the page-size hint
    pub(super) fn paged_url(&self, path_or_url: &str) -> Result<String> {
        let full = self.url(path_or_url);
        let mut url = Url::parse(&full).into_app_err_with(|| format!("invalid API URL '{full}'"))?;
        let _ = url.query_pairs_mut().append_pair("per_page", &self.settings.page_size.to_string());
        Ok(url.into())
    }

    /// GET an endpoint, failing on transport errors and on any non-success status
    pub async fn get(&self, path_or_url: &str) -> Result<reqwest::Response> {
        let url = self.url(path_or_url);
        log::debug!(target: LOG_TARGET, "GET '{url}'");

        let resp = resilient_get(&self.client, &url, &self.settings.retry, self.settings.request_timeout)
            .await
            .into_app_err_with(|| format!("request to '{url}' failed"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("request to '{url}' failed with status {status}");
        }

        Ok(resp)
    }

    /// GET an endpoint and return the raw response body
    pub async fn get_bytes(&self, path_or_url: &str) -> Result<Bytes> {
        let resp = self.get(path_or_url).await?;
        let url = resp.url().to_string();
        resp.bytes().await.into_app_err_with(|| format!("could not read response body from '{url}'"))
    }

    /// GET an endpoint and deserialize its JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path_or_url: &str) -> Result<T> {
        let bytes = self.get_bytes(path_or_url).await?;
        serde_json::from_slice(&bytes).into_app_err_with(|| format!("malformed JSON from '{}'", self.url(path_or_url)))
    }

    /// Lazily walk a paginated list endpoint, one page per call to [`Pages::next_page`]
    #[must_use]
    pub fn pages<T: DeserializeOwned>(&self, path_or_url: &str) -> Pages<'_, T> {
        Pages::new(self, path_or_url)
    }

    /// Fetch every page of a list endpoint, preserving the order items arrive in
    pub async fn fetch_all<T: DeserializeOwned>(&self, path_or_url: &str) -> Result<Vec<T>> {
        let mut pages = self.pages(path_or_url);
        let mut items = Vec::new();

        while let Some(mut page) = pages.next_page().await? {
            items.append(&mut page);
        }

        log::debug!(target: LOG_TARGET, "Fetched {} item(s) over {} page(s) from '{path_or_url}'", items.len(), pages.pages_fetched());
        Ok(items)
    }
}
