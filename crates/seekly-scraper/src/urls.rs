//! URL helpers: page-parameter handling, relative-link resolution, and
//! translation of human-facing listing URLs into API search parameters.

use url::Url;

use crate::error::ScrapeError;
use crate::providers::ApiRules;

/// Read the 1-based page number from a listing URL's `page` query
/// parameter. Missing or unparseable values default to page 1.
#[must_use]
pub fn current_page(url: &str) -> u32 {
    let Ok(parsed) = Url::parse(url) else {
        return 1;
    };
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Rewrite a listing URL to point at a specific page, replacing any
/// existing `page` parameter and preserving the rest of the query string.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidUrl`] if `url` does not parse.
pub fn page_url(url: &str, page: u32) -> Result<String, ScrapeError> {
    let mut parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed.set_query(None);
    {
        let mut pairs = parsed.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }
    Ok(parsed.into())
}

/// Resolve a possibly-relative link against a provider base URL. Returns
/// `None` for empty hrefs and the `"#"` placeholder sites use on dead
/// links.
#[must_use]
pub fn absolutize(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    // Protocol-relative image CDN links are common on listing cards.
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    Url::parse(base).ok()?.join(href).ok().map(|u| u.to_string())
}

/// Search parameters derived from a human-facing listing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub category: Option<String>,
    pub location: Option<String>,
}

/// Derive the search term, category, and location a listing URL encodes.
///
/// OLX-style listing paths put the term in a `q-honda-civic` path segment
/// and the category in a `mobiles_c1453`-style segment; a `q` query
/// parameter is accepted as a fallback.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidUrl`] if the URL does not parse or
/// carries no recognizable search term.
pub fn derive_search_query(url: &str) -> Result<SearchQuery, ScrapeError> {
    let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let query = segments
        .iter()
        .find_map(|seg| seg.strip_prefix("q-"))
        .map(|term| term.replace('-', " "))
        .or_else(|| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "q" || key == "query")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|term| !term.trim().is_empty())
        .ok_or_else(|| ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: "no search term in path or query".to_string(),
        })?;

    let category = segments.iter().find_map(|seg| {
        let (_, id) = seg.rsplit_once("_c")?;
        (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
    });

    let location = parsed
        .query_pairs()
        .find(|(key, _)| key == "location")
        .map(|(_, value)| value.into_owned());

    Ok(SearchQuery {
        query,
        category,
        location,
    })
}

/// Build the internal JSON search-endpoint URL for one page. The endpoint
/// page index is zero-based while listing URLs count from 1.
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidUrl`] if the target URL yields no search
/// term or the endpoint template is malformed.
pub fn api_url(api: &ApiRules, target: &str, page: u32) -> Result<String, ScrapeError> {
    let search = derive_search_query(target)?;
    let mut endpoint = Url::parse(api.endpoint).map_err(|e| ScrapeError::InvalidUrl {
        url: api.endpoint.to_string(),
        reason: e.to_string(),
    })?;

    {
        let mut pairs = endpoint.query_pairs_mut();
        pairs.append_pair("query", &search.query);
        if let Some(category) = &search.category {
            pairs.append_pair("category", category);
        }
        if let Some(location) = &search.location {
            pairs.append_pair("location", location);
        }
        pairs.append_pair("page", &page.saturating_sub(1).to_string());
    }
    Ok(endpoint.into())
}
