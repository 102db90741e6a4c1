//! Application configuration shape shared across the workspace.

use std::net::SocketAddr;

/// Deployment environment; controls log defaults only, there is no
/// environment-specific behavior in the scraping core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// All runtime configuration, resolved from environment variables once at
/// startup. See `config.rs` for variable names and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Per-request timeout for static and API fetches.
    pub fetch_timeout_secs: u64,
    /// Wall-clock ceiling for a rendered-page load.
    pub render_timeout_secs: u64,
    /// Bounded worker count for concurrent rendered-page fetches.
    pub render_concurrency: usize,
    /// Hard ceiling on pages walked per acquisition.
    pub max_pages: u32,
    /// Politeness delay between successive page fetches.
    pub page_delay_ms: u64,
    /// `User-Agent` sent on static and API fetches.
    pub user_agent: String,
}
