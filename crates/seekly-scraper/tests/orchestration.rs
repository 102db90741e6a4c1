//! End-to-end orchestration tests with scripted strategy implementations.
//!
//! No network traffic: each mock fetcher serves canned listing HTML keyed
//! by page number, so the tests pin down strategy fallback order,
//! pagination termination, dedup, and partial-failure behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use seekly_scraper::providers::{DomRules, FieldRule, ProviderConfig};
use seekly_scraper::{
    paginate_concurrent, Document, FetchMeta, FetchedPage, Orchestrator, PageFetcher,
    PaginationLimits, ScrapeError, StrategyKind,
};

static TEST_PROVIDERS: &[ProviderConfig] = &[ProviderConfig {
    name: "TestShop",
    hosts: &["shop.test"],
    strategies: &[StrategyKind::Api, StrategyKind::Static, StrategyKind::Rendered],
    base_url: "https://shop.test",
    currency: "PKR",
    price_prefix: "Rs",
    abbreviate_above: 1_000_000,
    wait_selector: "li.result",
    dom: DomRules {
        listing: &["li.result"],
        title: &[FieldRule { selector: "h2", attr: None }],
        price: &[FieldRule { selector: ".price", attr: None }],
        link: &[FieldRule { selector: "a", attr: Some("href") }],
        image: &[FieldRule { selector: "img", attr: Some("src") }],
        next_page: &["a.next"],
        card_jsonld: false,
        page_structured: false,
    },
    api: None,
}];

const TARGET: &str = "https://shop.test/items/q-widget";

fn listing_html(ids: &[u32], with_next: bool) -> String {
    let mut html = String::from("<html><body><ul>");
    for id in ids {
        html.push_str(&format!(
            r#"<li class="result"><a href="/item/{id}"><h2>Item {id}</h2><span class="price">Rs {id}00</span></a></li>"#
        ));
    }
    html.push_str("</ul>");
    if with_next {
        html.push_str(r#"<a class="next" href="?page=next">more</a>"#);
    }
    html.push_str("</body></html>");
    html
}

/// A scripted strategy: page N serves `pages[N-1]`; pages past the script
/// are empty. `Err` entries fail with a 503-shaped fetch error.
struct MockFetcher {
    kind: StrategyKind,
    pages: Vec<Result<String, ()>>,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    fn new(
        kind: StrategyKind,
        pages: Vec<Result<String, ()>>,
    ) -> (Arc<dyn PageFetcher>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher: Arc<dyn PageFetcher> = Arc::new(Self {
            kind,
            pages,
            calls: Arc::clone(&calls),
        });
        (fetcher, calls)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn fetch_page(
        &self,
        _provider: &ProviderConfig,
        url: &str,
        page: u32,
    ) -> Result<FetchedPage, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.pages.get(page.saturating_sub(1) as usize);
        let html = match scripted {
            Some(Ok(html)) => html.clone(),
            Some(Err(())) => {
                return Err(ScrapeError::UnexpectedStatus {
                    status: 503,
                    url: url.to_string(),
                })
            }
            None => listing_html(&[], false),
        };
        Ok(FetchedPage {
            document: Document::Html(html),
            has_next_hint: None,
            meta: FetchMeta {
                status: 200,
                elapsed: Duration::from_millis(1),
            },
        })
    }
}

fn fast_limits(max_pages: u32) -> PaginationLimits {
    PaginationLimits {
        max_pages,
        page_delay: Duration::ZERO,
    }
}

fn orchestrator(fetchers: Vec<Arc<dyn PageFetcher>>, max_pages: u32) -> Orchestrator {
    Orchestrator::with_fetchers(TEST_PROVIDERS, fetchers, fast_limits(max_pages))
}

#[tokio::test]
async fn unsupported_site_is_a_terminal_error() {
    let orch = orchestrator(Vec::new(), 3);
    let err = orch
        .acquire("https://example.com/foo")
        .await
        .expect_err("unknown host rejected");
    assert!(matches!(err, ScrapeError::UnsupportedSite { .. }));
}

#[tokio::test]
async fn pagination_stops_on_empty_page_and_keeps_all_records() {
    // Pages: 5 items, 5 items, 0 items; ceiling of 5 pages.
    let (static_fetcher, calls) = MockFetcher::new(
        StrategyKind::Static,
        vec![
            Ok(listing_html(&[1, 2, 3, 4, 5], true)),
            Ok(listing_html(&[6, 7, 8, 9, 10], true)),
            Ok(listing_html(&[], false)),
        ],
    );
    let orch = orchestrator(vec![static_fetcher], 5);

    let records = orch.acquire(TARGET).await.expect("acquisition succeeds");
    assert_eq!(records.len(), 10);
    assert_eq!(calls.load(Ordering::SeqCst), 3, "stops after the empty page");
    assert_eq!(records[0].url, "https://shop.test/item/1");
    assert_eq!(records[9].url, "https://shop.test/item/10");
}

#[tokio::test]
async fn dedup_by_url_first_occurrence_wins() {
    // Page 2 repeats 3 of page 1's items: expect 5 + 5 - 3 records.
    let (static_fetcher, _) = MockFetcher::new(
        StrategyKind::Static,
        vec![
            Ok(listing_html(&[1, 2, 3, 4, 5], true)),
            Ok(listing_html(&[3, 4, 5, 6, 7], false)),
        ],
    );
    let orch = orchestrator(vec![static_fetcher], 5);

    let records = orch.acquire(TARGET).await.expect("acquisition succeeds");
    assert_eq!(records.len(), 7);
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    let mut deduped = urls.clone();
    deduped.dedup();
    assert_eq!(urls, deduped, "no URL appears twice");
    // Insertion order is stable: page 1's items come first.
    assert_eq!(records[2].url, "https://shop.test/item/3");
    assert_eq!(records[5].url, "https://shop.test/item/6");
}

#[tokio::test]
async fn pagination_stops_when_next_page_affordance_is_absent() {
    let (static_fetcher, calls) = MockFetcher::new(
        StrategyKind::Static,
        vec![
            Ok(listing_html(&[1, 2], false)),
            Ok(listing_html(&[3, 4], false)),
        ],
    );
    let orch = orchestrator(vec![static_fetcher], 5);

    let records = orch.acquire(TARGET).await.expect("acquisition succeeds");
    assert_eq!(records.len(), 2, "page 2 never fetched");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fallback_skips_failed_strategy_and_never_escalates_past_success() {
    let (api, api_calls) = MockFetcher::new(StrategyKind::Api, vec![Err(())]);
    let (static_fetcher, static_calls) = MockFetcher::new(
        StrategyKind::Static,
        vec![Ok(listing_html(&[1, 2, 3], false))],
    );
    let (rendered, rendered_calls) = MockFetcher::new(
        StrategyKind::Rendered,
        vec![Ok(listing_html(&[8, 9], false))],
    );
    let orch = orchestrator(vec![api, static_fetcher, rendered], 3);

    let records = orch.acquire(TARGET).await.expect("fallback succeeds");
    assert_eq!(records.len(), 3, "static strategy's records are final");
    assert_eq!(api_calls.load(Ordering::SeqCst), 1);
    assert_eq!(static_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        rendered_calls.load(Ordering::SeqCst),
        0,
        "rendered strategy must never run after a lighter success"
    );
}

/// Always fails with an untranslatable-URL error, as the API strategy
/// does for listing URLs with no derivable search term.
struct UntranslatableUrlFetcher;

#[async_trait]
impl PageFetcher for UntranslatableUrlFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Api
    }

    async fn fetch_page(
        &self,
        _provider: &ProviderConfig,
        url: &str,
        _page: u32,
    ) -> Result<FetchedPage, ScrapeError> {
        Err(ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: "no search term in URL path".into(),
        })
    }
}

#[tokio::test]
async fn untranslatable_url_falls_back_to_static() {
    // A URL the API strategy cannot turn into a search query is still a
    // perfectly good static scrape target.
    let api: Arc<dyn PageFetcher> = Arc::new(UntranslatableUrlFetcher);
    let (static_fetcher, static_calls) = MockFetcher::new(
        StrategyKind::Static,
        vec![Ok(listing_html(&[11, 12], false))],
    );
    let orch = orchestrator(vec![api, static_fetcher], 3);

    let records = orch.acquire(TARGET).await.expect("fallback succeeds");
    assert_eq!(records.len(), 2);
    assert_eq!(static_calls.load(Ordering::SeqCst), 1);
    assert_eq!(records[0].url, "https://shop.test/item/11");
}

#[tokio::test]
async fn empty_strategy_results_advance_to_the_next_strategy() {
    let (api, _) = MockFetcher::new(StrategyKind::Api, vec![Ok(listing_html(&[], false))]);
    let (static_fetcher, _) = MockFetcher::new(
        StrategyKind::Static,
        vec![Ok(listing_html(&[42], false))],
    );
    let orch = orchestrator(vec![api, static_fetcher], 3);

    let records = orch.acquire(TARGET).await.expect("fallback succeeds");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://shop.test/item/42");
}

#[tokio::test]
async fn partial_results_survive_a_later_page_failure() {
    let (static_fetcher, _) = MockFetcher::new(
        StrategyKind::Static,
        vec![Ok(listing_html(&[1, 2, 3, 4], true)), Err(())],
    );
    let orch = orchestrator(vec![static_fetcher], 5);

    let records = orch.acquire(TARGET).await.expect("partial results kept");
    assert_eq!(records.len(), 4, "page 1's records are not discarded");
}

#[tokio::test]
async fn exhausted_strategies_yield_an_empty_set_not_an_error() {
    let (api, _) = MockFetcher::new(StrategyKind::Api, vec![Err(())]);
    let (static_fetcher, _) = MockFetcher::new(StrategyKind::Static, vec![Err(())]);
    let orch = orchestrator(vec![api, static_fetcher], 3);

    let records = orch.acquire(TARGET).await.expect("degrades to empty set");
    assert!(records.is_empty());
}

#[tokio::test]
async fn start_page_comes_from_the_url_query_parameter() {
    let (static_fetcher, _) = MockFetcher::new(
        StrategyKind::Static,
        vec![
            Ok(listing_html(&[1], true)),
            Ok(listing_html(&[2], true)),
            Ok(listing_html(&[3], false)),
        ],
    );
    let orch = orchestrator(vec![static_fetcher], 5);

    let records = orch
        .acquire("https://shop.test/items/q-widget?page=3")
        .await
        .expect("acquisition succeeds");
    // Page 3 is the scripted third entry; it has no next page.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://shop.test/item/3");
}

#[tokio::test]
async fn concurrent_pagination_merges_in_page_order() {
    let (rendered, _) = MockFetcher::new(
        StrategyKind::Rendered,
        vec![
            Ok(listing_html(&[1, 2], true)),
            Ok(listing_html(&[2, 3], true)),
            Ok(listing_html(&[], false)),
        ],
    );
    let provider = &TEST_PROVIDERS[0];
    let records = paginate_concurrent(rendered.as_ref(), provider, TARGET, &fast_limits(5), 3)
        .await
        .expect("concurrent walk succeeds");

    // Dedup against page order, not completion order.
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://shop.test/item/1",
            "https://shop.test/item/2",
            "https://shop.test/item/3",
        ]
    );
}
