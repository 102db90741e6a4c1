//! Multi-strategy listing acquisition for third-party e-commerce sites.
//!
//! Given a target URL, the orchestrator selects a provider by URL pattern,
//! tries acquisition strategies in priority order (internal JSON API,
//! static HTML, rendered browser), paginates through result sets with
//! URL-level dedup, and falls back gracefully when a strategy fails or
//! returns nothing.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod orchestrate;
pub mod paginate;
pub mod providers;
pub mod render;
pub mod types;
pub mod urls;

pub use error::ScrapeError;
pub use fetch::{ApiFetcher, PageFetcher, StaticFetcher};
pub use normalize::{format_price, normalize_item};
pub use orchestrate::Orchestrator;
pub use paginate::{paginate, paginate_concurrent, PaginationLimits};
pub use providers::{match_provider, ProviderConfig, PROVIDERS};
pub use render::BrowserFetcher;
pub use types::{Document, FetchMeta, FetchedPage, RawItem, RawPrice, StrategyKind};
