mod app_config;
mod config;
mod records;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use records::{SearchResult, NO_PRICE_SENTINEL, NO_TITLE_SENTINEL};
