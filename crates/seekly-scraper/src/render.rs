//! Rendered acquisition: drive a headless Chromium session for pages that
//! only populate their listings from JavaScript.
//!
//! The browser is a scarce resource. Each fetch launches a scoped session
//! and releases it on every exit path — success, fetch error, or timeout —
//! and teardown failures are logged and swallowed so they never mask the
//! primary result.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;

use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::providers::ProviderConfig;
use crate::types::{Document, FetchMeta, FetchedPage, StrategyKind};
use crate::urls::page_url;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Slack on top of the render wait for navigation and content capture.
const NAVIGATION_GRACE_SECS: u64 = 10;

/// Headless-browser page fetcher.
pub struct BrowserFetcher {
    render_timeout: Duration,
}

impl BrowserFetcher {
    #[must_use]
    pub fn new(render_timeout_secs: u64) -> Self {
        Self {
            render_timeout: Duration::from_secs(render_timeout_secs),
        }
    }

    async fn render(&self, browser: &Browser, provider: &ProviderConfig, url: &str) -> Result<String, ScrapeError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        // Wait for the listing element rather than a fixed sleep: it fires
        // as soon as the content exists and tolerates slow loads up to the
        // deadline.
        let appeared = wait_for_selector(&page, provider.wait_selector, self.render_timeout).await;
        if !appeared {
            tracing::debug!(
                provider = provider.name,
                selector = provider.wait_selector,
                "listing element never appeared; capturing page as-is"
            );
        }

        page.content()
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Rendered
    }

    async fn fetch_page(
        &self,
        provider: &ProviderConfig,
        url: &str,
        page: u32,
    ) -> Result<FetchedPage, ScrapeError> {
        let target = page_url(url, page)?;
        let started = Instant::now();

        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1200, 800)
            .build()
            .map_err(ScrapeError::Browser)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let total_budget = self.render_timeout + Duration::from_secs(NAVIGATION_GRACE_SECS);
        let outcome = match tokio::time::timeout(total_budget, self.render(&browser, provider, &target)).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout {
                what: format!("rendered page {target}"),
                timeout_secs: total_budget.as_secs(),
            }),
        };

        // Unconditional teardown; a failed close must not replace the
        // render outcome.
        if let Err(err) = browser.close().await {
            tracing::warn!(error = %err, "browser close failed");
        }
        if let Err(err) = browser.wait().await {
            tracing::debug!(error = %err, "browser process reap failed");
        }
        handler_task.abort();

        let html = outcome?;
        tracing::debug!(url = target, page, bytes = html.len(), "rendered fetch complete");
        Ok(FetchedPage {
            document: Document::Html(html),
            has_next_hint: None,
            meta: FetchMeta {
                status: 200,
                elapsed: started.elapsed(),
            },
        })
    }
}

/// Poll for a selector until it appears or the deadline lapses.
async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(WAIT_POLL_INTERVAL).await;
    }
}
