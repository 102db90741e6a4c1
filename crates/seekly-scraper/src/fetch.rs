//! HTTP acquisition strategies: static HTML GET and internal JSON API GET.
//!
//! Exactly one strategy executes per page attempt; whether to retry with a
//! different strategy is the fallback orchestrator's call, not this
//! module's.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::ScrapeError;
use crate::providers::ProviderConfig;
use crate::types::{Document, FetchMeta, FetchedPage, StrategyKind};
use crate::urls::{api_url, page_url};

/// One acquisition strategy, polymorphic so the orchestrator (and tests)
/// can swap implementations freely.
///
/// `url` is the caller's listing URL; the fetcher derives the concrete
/// page-N request from it. Pagination passes page numbers, never raw
/// per-page URLs, so concurrent fetches merge deterministically.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Fetch one page of the listing at `url`.
    ///
    /// # Errors
    ///
    /// Any [`ScrapeError`] with `is_fetch_error() == true`; callers recover
    /// by falling back or keeping partial results.
    async fn fetch_page(
        &self,
        provider: &ProviderConfig,
        url: &str,
        page: u32,
    ) -> Result<FetchedPage, ScrapeError>;
}

fn build_client(timeout_secs: u64, user_agent: &str) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// Plain HTTP GET of the listing page. Sites reject default client
/// signatures, so the request carries a realistic browser header set.
pub struct StaticFetcher {
    client: reqwest::Client,
}

impl StaticFetcher {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
        })
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Static
    }

    async fn fetch_page(
        &self,
        _provider: &ProviderConfig,
        url: &str,
        page: u32,
    ) -> Result<FetchedPage, ScrapeError> {
        let target = page_url(url, page)?;
        let started = Instant::now();

        let response = self
            .client
            .get(&target)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: target,
            });
        }

        let body = response.text().await?;
        tracing::debug!(url = target, page, bytes = body.len(), "static fetch complete");
        Ok(FetchedPage {
            document: Document::Html(body),
            has_next_hint: None,
            meta: FetchMeta {
                status: status.as_u16(),
                elapsed: started.elapsed(),
            },
        })
    }
}

/// GET against the site's internal JSON search endpoint, translated from
/// the human-facing listing URL. A non-2xx status, a decode failure, or an
/// empty items array is a fetch error so the orchestrator falls back to
/// static HTML.
pub struct ApiFetcher {
    client: reqwest::Client,
}

impl ApiFetcher {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
        })
    }
}

#[async_trait]
impl PageFetcher for ApiFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Api
    }

    async fn fetch_page(
        &self,
        provider: &ProviderConfig,
        url: &str,
        page: u32,
    ) -> Result<FetchedPage, ScrapeError> {
        let Some(api) = provider.api.as_ref() else {
            return Err(ScrapeError::InvalidUrl {
                url: url.to_string(),
                reason: format!("{} has no API endpoint", provider.name),
            });
        };
        let target = api_url(api, url, page)?;
        let started = Instant::now();

        let response = self
            .client
            .get(&target)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: target,
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|source| ScrapeError::Deserialize {
                context: target.clone(),
                source,
            })?;

        // An empty result array means the endpoint did not understand the
        // derived query, not that the listing is empty; signal fallback.
        let empty = value
            .pointer(&json_pointer(api.items_path))
            .and_then(serde_json::Value::as_array)
            .is_none_or(Vec::is_empty);
        if empty {
            return Err(ScrapeError::EmptyApiResult { url: target });
        }

        tracing::debug!(url = target, page, "API fetch complete");
        Ok(FetchedPage {
            document: Document::Json(value),
            has_next_hint: None,
            meta: FetchMeta {
                status: status.as_u16(),
                elapsed: started.elapsed(),
            },
        })
    }
}

fn json_pointer(path: &[&str]) -> String {
    let mut pointer = String::new();
    for key in path {
        pointer.push('/');
        pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
    }
    pointer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_pointer_escapes_keys() {
        assert_eq!(json_pointer(&["data"]), "/data");
        assert_eq!(json_pointer(&["a", "b/c"]), "/a/b~1c");
    }
}
