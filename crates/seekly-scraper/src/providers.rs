//! Static per-provider configuration.
//!
//! Provider differences are pure data — host patterns, strategy order,
//! selector chains, URL templates. The extraction and pagination code is
//! shared; adding a site means adding a table entry, not a code fork.
//!
//! Selector chains are ordered most-specific-first: target markup is
//! unstable and class names rotate between deploys, so each field carries
//! fallback selectors and the first non-empty match wins.

use crate::types::StrategyKind;

/// One candidate extraction rule for a field: a CSS selector plus the
/// attribute to read (element text when `attr` is `None`).
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub selector: &'static str,
    pub attr: Option<&'static str>,
}

/// DOM extraction rules for one provider.
#[derive(Debug, Clone, Copy)]
pub struct DomRules {
    /// Candidate selectors for the listing-card container; the first chain
    /// that matches any elements wins.
    pub listing: &'static [&'static str],
    pub title: &'static [FieldRule],
    pub price: &'static [FieldRule],
    pub link: &'static [FieldRule],
    pub image: &'static [FieldRule],
    /// Selectors matching an *enabled* next-page affordance.
    pub next_page: &'static [&'static str],
    /// Prefer a per-card `application/ld+json` block over the field chains.
    pub card_jsonld: bool,
    /// Whole-document structured-data extraction (JSON-LD, then Open Graph)
    /// for single-product pages.
    pub page_structured: bool,
}

/// JSON search-endpoint rules for providers with a usable internal API.
/// Paths are fixed key sequences into the decoded payload.
#[derive(Debug, Clone, Copy)]
pub struct ApiRules {
    pub endpoint: &'static str,
    pub items_path: &'static [&'static str],
    pub title_path: &'static [&'static str],
    /// Display-form price, preferred when present.
    pub price_display_path: &'static [&'static str],
    /// Bare numeric amount, fallback when no display form exists.
    pub price_raw_path: &'static [&'static str],
    pub url_path: &'static [&'static str],
    /// URL slug, composed into a detail link when `url_path` is absent.
    pub slug_path: &'static [&'static str],
    pub image_path: &'static [&'static str],
}

/// Immutable configuration for one target site.
#[derive(Debug, Clone, Copy)]
pub struct ProviderConfig {
    pub name: &'static str,
    /// Host suffixes this provider claims.
    pub hosts: &'static [&'static str],
    /// Strategies in priority order, fastest/cheapest first.
    pub strategies: &'static [StrategyKind],
    /// Base for resolving relative links.
    pub base_url: &'static str,
    pub currency: &'static str,
    /// Display prefix for numeric prices ("Rs" for PKR).
    pub price_prefix: &'static str,
    /// Numeric prices strictly above this render in abbreviated "Lacs"
    /// form, the conventional unit for used-vehicle prices.
    pub abbreviate_above: u64,
    /// Element whose appearance signals the listing has rendered.
    pub wait_selector: &'static str,
    pub dom: DomRules,
    pub api: Option<ApiRules>,
}

pub static OLX: ProviderConfig = ProviderConfig {
    name: "OLX",
    hosts: &["olx.com.pk", "olx.com"],
    strategies: &[StrategyKind::Api, StrategyKind::Static, StrategyKind::Rendered],
    base_url: "https://www.olx.com.pk",
    currency: "PKR",
    price_prefix: "Rs",
    abbreviate_above: 1_000_000,
    wait_selector: r#"li[aria-label="Listing"]"#,
    dom: DomRules {
        listing: &[
            r#"ul._1aad128c li[aria-label="Listing"]"#,
            r#"li[aria-label="Listing"]"#,
            r#"[data-aut-id="itemBox"]"#,
        ],
        title: &[
            FieldRule { selector: r#"div[aria-label="Title"] h2"#, attr: None },
            FieldRule { selector: r#"[data-aut-id="itemTitle"]"#, attr: None },
            FieldRule { selector: "h6", attr: None },
            FieldRule { selector: "h5", attr: None },
            FieldRule { selector: "h4", attr: None },
            FieldRule { selector: r#"span[class*="title"]"#, attr: None },
        ],
        price: &[
            FieldRule { selector: r#"div[aria-label="Price"] span"#, attr: None },
            FieldRule { selector: r#"[data-aut-id="itemPrice"]"#, attr: None },
            FieldRule { selector: r#"span[class*="price"]"#, attr: None },
            FieldRule { selector: r#"div[class*="price"]"#, attr: None },
        ],
        link: &[
            FieldRule { selector: r#"a[href*="/item/"]"#, attr: Some("href") },
            FieldRule { selector: "a", attr: Some("href") },
        ],
        image: &[
            FieldRule { selector: "img", attr: Some("src") },
            FieldRule { selector: "img", attr: Some("data-src") },
            FieldRule { selector: "source", attr: Some("srcset") },
        ],
        next_page: &[r#"[data-testid="pagination-forward"]:not([disabled])"#],
        card_jsonld: false,
        page_structured: false,
    },
    api: Some(ApiRules {
        endpoint: "https://www.olx.com.pk/api/relevance/v4/search",
        items_path: &["data"],
        title_path: &["title"],
        price_display_path: &["price", "value", "display"],
        price_raw_path: &["price", "value", "raw"],
        url_path: &["url"],
        slug_path: &["slug"],
        image_path: &["main_info", "image", "url"],
    }),
};

pub static PAKWHEELS: ProviderConfig = ProviderConfig {
    name: "PakWheels",
    hosts: &["pakwheels.com"],
    strategies: &[StrategyKind::Static],
    base_url: "https://www.pakwheels.com",
    currency: "PKR",
    price_prefix: "Rs",
    abbreviate_above: 1_000_000,
    wait_selector: "li.search-listing-card",
    dom: DomRules {
        listing: &["li.search-listing-card", ".search-page__result"],
        title: &[
            FieldRule { selector: ".car-name", attr: None },
            FieldRule { selector: "h3 a", attr: None },
        ],
        price: &[
            FieldRule { selector: ".price-details", attr: None },
            FieldRule { selector: ".price", attr: None },
        ],
        link: &[
            FieldRule { selector: ".car-name a", attr: Some("href") },
            FieldRule { selector: "a", attr: Some("href") },
        ],
        image: &[
            FieldRule { selector: "img", attr: Some("src") },
            FieldRule { selector: "img", attr: Some("data-original") },
        ],
        next_page: &["li.next_page a", r#"a[rel="next"]"#],
        card_jsonld: true,
        page_structured: false,
    },
    api: None,
};

pub static DARAZ: ProviderConfig = ProviderConfig {
    name: "Daraz",
    hosts: &["daraz.pk", "daraz.com"],
    strategies: &[StrategyKind::Rendered, StrategyKind::Static],
    base_url: "https://www.daraz.pk",
    currency: "PKR",
    price_prefix: "Rs",
    abbreviate_above: 1_000_000,
    wait_selector: r#"div[data-qa-locator="product-item"]"#,
    dom: DomRules {
        listing: &[r#"div[data-qa-locator="product-item"]"#],
        title: &[
            FieldRule { selector: r#"div[title] a"#, attr: Some("title") },
            FieldRule { selector: "a[title]", attr: Some("title") },
        ],
        price: &[
            FieldRule { selector: r#"span[class*="price"]"#, attr: None },
            FieldRule { selector: r#"div[class*="price"] span"#, attr: None },
        ],
        link: &[FieldRule { selector: "a", attr: Some("href") }],
        image: &[
            FieldRule { selector: "img", attr: Some("src") },
            FieldRule { selector: "img", attr: Some("data-src") },
        ],
        next_page: &[r#"li[title="Next Page"]:not(.ant-pagination-disabled) a"#],
        card_jsonld: false,
        page_structured: true,
    },
    api: None,
};

/// All known providers, matched in declaration order.
pub static PROVIDERS: &[ProviderConfig] = &[OLX, PAKWHEELS, DARAZ];

/// Match a target URL against a provider table by host suffix.
#[must_use]
pub fn match_provider<'a>(providers: &'a [ProviderConfig], url: &str) -> Option<&'a ProviderConfig> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    providers.iter().find(|provider| {
        provider
            .hosts
            .iter()
            .any(|pattern| host == *pattern || host.ends_with(&format!(".{pattern}")))
    })
}
