pub mod api;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod normalize;
pub mod reports;
pub mod resolver;
pub mod types;
pub mod utils;
pub mod views;

pub use api::{CaixaClient, DrawSource};
pub use config::Config;
pub use database::DrawCache;
pub use error::{CacheError, FetchError};
pub use resolver::{PrefetchSummary, Resolver};
pub use types::*;
pub use utils::CurrencyStyle;
pub use views::DrawPage;

use std::sync::Arc;

/// Wires the API client and the cache described by `config` into a resolver.
pub fn build_resolver(config: &Config) -> anyhow::Result<Resolver> {
    let client = CaixaClient::new(&config.api_url, config.timeout)?;
    let cache = DrawCache::open(&config.database_path)?;
    Ok(Resolver::new(Arc::new(client), cache, config.currency_style))
}
