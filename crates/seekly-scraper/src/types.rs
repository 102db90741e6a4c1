//! Transient types flowing between the acquisition strategies, the site
//! extractors, and the pagination driver. Everything here lives and dies
//! within a single `acquire` call.

use std::time::Duration;

/// One acquisition method, ordered fastest/cheapest first in each
/// provider's strategy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Direct GET against the site's internal JSON search endpoint.
    Api,
    /// Plain HTTP GET of the listing page; no JavaScript execution.
    Static,
    /// Headless-browser render for JavaScript-heavy pages.
    Rendered,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Api => "api",
            StrategyKind::Static => "static",
            StrategyKind::Rendered => "rendered",
        }
    }
}

/// A fetched page body, already decoded into the shape the extractor needs.
#[derive(Debug, Clone)]
pub enum Document {
    Html(String),
    Json(serde_json::Value),
}

/// Fetch metadata for one page attempt.
#[derive(Debug, Clone, Copy)]
pub struct FetchMeta {
    pub status: u16,
    pub elapsed: Duration,
}

/// Raw per-page outcome of one acquisition-strategy fetch.
#[derive(Debug)]
pub struct FetchedPage {
    pub document: Document,
    /// `Some(false)` when the strategy itself already knows there is no
    /// further page; `None` when only the document can tell.
    pub has_next_hint: Option<bool>,
    pub meta: FetchMeta,
}

/// An unnormalized price as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPrice {
    /// Already display-formatted by the site ("Rs 1,500").
    Display(String),
    /// A bare amount from structured data or an API payload.
    Numeric(u64),
}

/// One unnormalized extraction result. Field names are already unified
/// across providers; values are still site-shaped (relative links, raw
/// amounts, untrimmed text).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub price: Option<RawPrice>,
    pub url: Option<String>,
    pub image: Option<String>,
}
