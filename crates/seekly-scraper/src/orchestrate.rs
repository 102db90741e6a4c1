//! Fallback orchestration: pick a provider for the target URL, then try
//! its acquisition strategies in priority order until one yields records.
//!
//! A strategy that errors or comes back empty advances to the next one; a
//! strategy that yields at least one record is final — escalating to a
//! heavier strategy after a successful lighter extraction would only burn
//! resources. Exhausting every strategy is not an error: an empty listing
//! page is a valid outcome distinct from a broken scraper.

use std::sync::Arc;
use std::time::Duration;

use seekly_core::{AppConfig, SearchResult};

use crate::error::ScrapeError;
use crate::fetch::{ApiFetcher, PageFetcher, StaticFetcher};
use crate::paginate::{paginate, paginate_concurrent, PaginationLimits};
use crate::providers::{match_provider, ProviderConfig, PROVIDERS};
use crate::render::BrowserFetcher;
use crate::types::StrategyKind;

/// Top-level acquisition entry point. Stateless between calls apart from
/// the constant provider table and the shared HTTP clients; concurrent
/// `acquire` calls never share mutable state.
pub struct Orchestrator {
    providers: &'static [ProviderConfig],
    fetchers: Vec<Arc<dyn PageFetcher>>,
    limits: PaginationLimits,
    render_concurrency: usize,
}

impl Orchestrator {
    /// Build the production wiring from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        let fetchers: Vec<Arc<dyn PageFetcher>> = vec![
            Arc::new(ApiFetcher::new(config.fetch_timeout_secs, &config.user_agent)?),
            Arc::new(StaticFetcher::new(config.fetch_timeout_secs, &config.user_agent)?),
            Arc::new(BrowserFetcher::new(config.render_timeout_secs)),
        ];
        Ok(Self {
            providers: PROVIDERS,
            fetchers,
            limits: PaginationLimits {
                max_pages: config.max_pages,
                page_delay: Duration::from_millis(config.page_delay_ms),
            },
            render_concurrency: config.render_concurrency,
        })
    }

    /// Test seam: explicit provider table and strategy implementations.
    #[must_use]
    pub fn with_fetchers(
        providers: &'static [ProviderConfig],
        fetchers: Vec<Arc<dyn PageFetcher>>,
        limits: PaginationLimits,
    ) -> Self {
        Self {
            providers,
            fetchers,
            limits,
            render_concurrency: 1,
        }
    }

    fn fetcher_for(&self, kind: StrategyKind) -> Option<&Arc<dyn PageFetcher>> {
        self.fetchers.iter().find(|f| f.kind() == kind)
    }

    /// Acquire normalized records for a listing URL.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::UnsupportedSite`] when no provider claims the URL —
    /// the only error this method surfaces. Strategy failures degrade to
    /// the next strategy and, ultimately, to an empty result set.
    pub async fn acquire(&self, url: &str) -> Result<Vec<SearchResult>, ScrapeError> {
        let provider =
            match_provider(self.providers, url).ok_or_else(|| ScrapeError::UnsupportedSite {
                url: url.to_string(),
            })?;
        tracing::info!(provider = provider.name, url, "acquisition started");

        for kind in provider.strategies {
            let Some(fetcher) = self.fetcher_for(*kind) else {
                tracing::debug!(strategy = kind.as_str(), "no fetcher wired for strategy");
                continue;
            };

            // Rendered fetches are independent sessions, so they may run a
            // bounded page range concurrently; HTTP strategies walk
            // sequentially and honor the inter-page delay.
            let outcome = if *kind == StrategyKind::Rendered && self.render_concurrency > 1 {
                paginate_concurrent(
                    fetcher.as_ref(),
                    provider,
                    url,
                    &self.limits,
                    self.render_concurrency,
                )
                .await
            } else {
                paginate(fetcher.as_ref(), provider, url, &self.limits).await
            };

            match outcome {
                Ok(records) if !records.is_empty() => {
                    tracing::info!(
                        provider = provider.name,
                        strategy = kind.as_str(),
                        records = records.len(),
                        "acquisition succeeded"
                    );
                    return Ok(records);
                }
                Ok(_) => {
                    tracing::info!(
                        provider = provider.name,
                        strategy = kind.as_str(),
                        "strategy yielded no records; falling back"
                    );
                }
                Err(err) if err.is_fetch_error() => {
                    tracing::warn!(
                        provider = provider.name,
                        strategy = kind.as_str(),
                        error = %err,
                        "strategy failed; falling back"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(provider = provider.name, url, "all strategies exhausted, no records");
        Ok(Vec::new())
    }

    /// Provider display name for a URL, for response metadata.
    #[must_use]
    pub fn source_for(&self, url: &str) -> Option<&'static str> {
        match_provider(self.providers, url).map(|p| p.name)
    }
}
