use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::api::{MoviePage, PageFailure, PageOutcome, PageSource};
use crate::config::Config;
use crate::error::{Error, Result};

/// `now_playing` client for the TMDB v3 API.
pub struct TmdbClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str, language: &str, timeout: Option<Duration>) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') { base.push('/'); }
        let base = Url::parse(&base).map_err(|e| Error::Config(format!("invalid base url `{base_url}`: {e}")))?;
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout { builder = builder.timeout(t); }
        let http = builder.build().map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self { http, base, api_key: api_key.to_string(), language: language.to_string() })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let key = cfg.require_api_key()?;
        Self::new(&cfg.base_url, key, &cfg.language, cfg.request_timeout_secs.map(Duration::from_secs))
    }

    pub fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = self
            .base
            .join("movie/now_playing")
            .map_err(|e| Error::Config(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("language", &self.language)
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for TmdbClient {
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome> {
        let url = self.page_url(page)?;
        debug!(page, "requesting now_playing page");
        let resp = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(page, error = %e, "request failed");
                return Ok(PageOutcome::Failed(PageFailure { page, status: e.status().map(|s| s.as_u16()), reason: e.to_string() }));
            }
        };
        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(page, error = %e, "reading body failed");
                return Ok(PageOutcome::Failed(PageFailure { page, status: Some(status.as_u16()), reason: e.to_string() }));
            }
        };
        outcome_from(page, status, &body)
    }
}

/// Only a 200 carries records; any other status is a failed page whatever the body says.
pub(crate) fn outcome_from(page: u32, status: StatusCode, body: &str) -> Result<PageOutcome> {
    if status != StatusCode::OK {
        warn!(page, status = status.as_u16(), "API request failed");
        return Ok(PageOutcome::Failed(failure_from_status(page, status)));
    }
    let records = decode_page(page, body)?;
    debug!(page, count = records.len(), "page decoded");
    Ok(PageOutcome::Fetched(records))
}

fn failure_from_status(page: u32, status: StatusCode) -> PageFailure {
    PageFailure {
        page,
        status: Some(status.as_u16()),
        reason: status.canonical_reason().unwrap_or("unexpected status").to_string(),
    }
}

/// A 200 body that lacks a `results` array means the API shape changed.
pub(crate) fn decode_page(page: u32, body: &str) -> Result<Vec<crate::api::MovieRecord>> {
    serde_json::from_str::<MoviePage>(body)
        .map(|p| p.results)
        .map_err(|e| Error::data_format(format!("page {page}: unexpected response body: {e}")))
}
