use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no provider recognizes URL: {url}")]
    UnsupportedSite { url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("API returned no items for {url}")]
    EmptyApiResult { url: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out waiting for {what} after {timeout_secs}s")]
    Timeout { what: String, timeout_secs: u64 },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScrapeError {
    /// `true` for failures of a single acquisition attempt — the fallback
    /// orchestrator recovers from these by advancing to the next strategy,
    /// and the pagination driver by keeping already-accumulated pages.
    /// [`ScrapeError::UnsupportedSite`] is the only variant that surfaces
    /// to the caller. [`ScrapeError::InvalidUrl`] counts as recoverable on
    /// purpose: a URL the API fetcher cannot translate (no derivable
    /// search term) may still be perfectly scrapable statically.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        !matches!(self, ScrapeError::UnsupportedSite { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_site_is_not_a_fetch_error() {
        let err = ScrapeError::UnsupportedSite {
            url: "https://example.com".into(),
        };
        assert!(!err.is_fetch_error());
    }

    #[test]
    fn status_and_timeout_are_fetch_errors() {
        let status = ScrapeError::UnexpectedStatus {
            status: 503,
            url: "https://www.olx.com.pk/items/q-bike".into(),
        };
        let timeout = ScrapeError::Timeout {
            what: "rendered page".into(),
            timeout_secs: 20,
        };
        assert!(status.is_fetch_error());
        assert!(timeout.is_fetch_error());
    }

    #[test]
    fn invalid_url_is_a_fetch_error() {
        let err = ScrapeError::InvalidUrl {
            url: "https://www.olx.com.pk/".into(),
            reason: "no search term in URL path".into(),
        };
        assert!(err.is_fetch_error());
    }
}
