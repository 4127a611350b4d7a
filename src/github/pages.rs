use super::client::Client;
use super::links::LinkRelations;
use crate::Result;
use core::marker::PhantomData;
use ohno::IntoAppError;
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = "    github";

/// Hard stop for runaway pagination
const MAX_PAGES: u32 = 1000;

/// A finite, non-restartable walk over a paginated list endpoint.
///
/// Each page's `Link` header decides whether there is another page. Nothing is requested until
/// [`Pages::next_page`] is called.
#[derive(Debug)]
pub struct Pages<'a, T> {
    client: &'a Client,
    start: String,
    next_url: Option<String>,
    started: bool,
    fetched: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Pages<'a, T> {
    pub(super) fn new(client: &'a Client, path_or_url: &str) -> Self {
        Self {
            client,
            start: path_or_url.to_string(),
            next_url: None,
            started: false,
            fetched: 0,
            _marker: PhantomData,
        }
    }

    /// Number of pages retrieved so far
    #[must_use]
    pub const fn pages_fetched(&self) -> u32 {
        self.fetched
    }

    /// Fetch the next page, or `None` once the sequence is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        let url = if self.started {
            match self.next_url.take() {
                Some(url) => url,
                None => return Ok(None),
            }
        } else {
            self.started = true;
            self.client.paged_url(&self.start)?
        };

        if self.fetched >= MAX_PAGES {
            log::warn!(target: LOG_TARGET, "Stopping pagination of '{}' after {MAX_PAGES} pages", self.start);
            return Ok(None);
        }

        let resp = self.client.get(&url).await?;
        let links = LinkRelations::from_headers(resp.headers());
        let bytes = resp
            .bytes()
            .await
            .into_app_err_with(|| format!("could not read response body from '{url}'"))?;

        let items: Vec<T> = serde_json::from_slice(&bytes).into_app_err_with(|| format!("malformed JSON page from '{url}'"))?;

        self.fetched += 1;
        self.next_url = links.follow_from(&url);

        log::debug!(target: LOG_TARGET, "Page {} of '{}' had {} item(s), more pages: {}", self.fetched, self.start, items.len(), self.next_url.is_some());

        Ok(Some(items))
    }
}
