//! Pagination driver: walk successive listing pages through one
//! acquisition strategy, merging normalized records with URL dedup.
//!
//! Termination, in priority order: a page yields zero raw items; the
//! document shows no enabled next-page affordance; the page ceiling is
//! reached. All three are normal completions. A fetch error after at
//! least one successful page ends the walk but keeps the accumulated
//! records — partial results are not thrown away because a later page
//! failed.

use std::collections::HashSet;
use std::time::Duration;

use futures::StreamExt;
use seekly_core::SearchResult;

use crate::error::ScrapeError;
use crate::extract::{detect_next_page, extract_items};
use crate::fetch::PageFetcher;
use crate::normalize::normalize_item;
use crate::providers::ProviderConfig;
use crate::types::FetchedPage;
use crate::urls::{current_page, page_url};

/// Bounds for one pagination walk.
#[derive(Debug, Clone, Copy)]
pub struct PaginationLimits {
    pub max_pages: u32,
    /// Politeness delay between successive page fetches. Fixed, not
    /// adaptive — defensive throttling on the target side is out of scope.
    pub page_delay: Duration,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            max_pages: 3,
            page_delay: Duration::from_millis(500),
        }
    }
}

struct Accumulator<'a> {
    provider: &'a ProviderConfig,
    seen: HashSet<String>,
    records: Vec<SearchResult>,
}

impl<'a> Accumulator<'a> {
    fn new(provider: &'a ProviderConfig) -> Self {
        Self {
            provider,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Merge one fetched page. Returns `false` when pagination should stop
    /// after this page (empty page or no next-page affordance).
    fn merge(&mut self, fetched: &FetchedPage, page_href: &str) -> bool {
        let raw_items = extract_items(&fetched.document, self.provider);
        if raw_items.is_empty() {
            return false;
        }

        for mut raw in raw_items {
            // Single-product structured pages often omit their own URL from
            // the metadata; the fetched page address is the detail link.
            if raw.url.is_none() && self.provider.dom.page_structured {
                raw.url = Some(page_href.to_string());
            }
            let Some(record) = normalize_item(raw, self.provider) else {
                continue;
            };
            // First occurrence wins; insertion order is preserved.
            if self.seen.insert(record.url.clone()) {
                self.records.push(record);
            }
        }

        let has_next = fetched
            .has_next_hint
            .or_else(|| detect_next_page(&fetched.document, self.provider));
        has_next != Some(false)
    }
}

/// Walk pages sequentially starting from the URL's own page number.
///
/// # Errors
///
/// Propagates the fetch error only when the *first* page fails; later
/// failures return the partial accumulation.
pub async fn paginate(
    fetcher: &dyn PageFetcher,
    provider: &ProviderConfig,
    url: &str,
    limits: &PaginationLimits,
) -> Result<Vec<SearchResult>, ScrapeError> {
    let start = current_page(url);
    let mut acc = Accumulator::new(provider);
    let mut fetched_any = false;

    for page in start..start.saturating_add(limits.max_pages.max(1)) {
        if fetched_any && !limits.page_delay.is_zero() {
            tokio::time::sleep(limits.page_delay).await;
        }

        let fetched = match fetcher.fetch_page(provider, url, page).await {
            Ok(fetched) => fetched,
            Err(err) if fetched_any => {
                tracing::warn!(
                    provider = provider.name,
                    page,
                    error = %err,
                    "page fetch failed; returning partial results"
                );
                break;
            }
            Err(err) => return Err(err),
        };
        fetched_any = true;

        let page_href = page_url(url, page).unwrap_or_else(|_| url.to_string());
        if !acc.merge(&fetched, &page_href) {
            break;
        }
    }

    tracing::info!(
        provider = provider.name,
        strategy = fetcher.kind().as_str(),
        records = acc.records.len(),
        "pagination complete"
    );
    Ok(acc.records)
}

/// Walk a known page range with bounded concurrency, for strategies
/// without same-session ordering (independent rendered fetches).
///
/// Fetches complete in arbitrary order but are merged strictly in
/// page-number order, so dedup is deterministic regardless of scheduling.
/// The merged sequence is truncated at the first empty or failed page,
/// matching the sequential driver's termination.
///
/// # Errors
///
/// Propagates the fetch error only when the first page fails.
pub async fn paginate_concurrent(
    fetcher: &dyn PageFetcher,
    provider: &ProviderConfig,
    url: &str,
    limits: &PaginationLimits,
    concurrency: usize,
) -> Result<Vec<SearchResult>, ScrapeError> {
    let start = current_page(url);
    let pages: Vec<u32> = (start..start.saturating_add(limits.max_pages.max(1))).collect();

    let outcomes: Vec<(u32, Result<FetchedPage, ScrapeError>)> =
        futures::stream::iter(pages.into_iter().map(|page| async move {
            (page, fetcher.fetch_page(provider, url, page).await)
        }))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut acc = Accumulator::new(provider);
    let mut merged_any = false;
    for (page, outcome) in outcomes {
        match outcome {
            Ok(fetched) => {
                let page_href = page_url(url, page).unwrap_or_else(|_| url.to_string());
                let keep_going = acc.merge(&fetched, &page_href);
                merged_any = true;
                if !keep_going {
                    break;
                }
            }
            Err(err) if merged_any => {
                tracing::warn!(
                    provider = provider.name,
                    page,
                    error = %err,
                    "page fetch failed; returning partial results"
                );
                break;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        provider = provider.name,
        strategy = fetcher.kind().as_str(),
        records = acc.records.len(),
        "concurrent pagination complete"
    );
    Ok(acc.records)
}
