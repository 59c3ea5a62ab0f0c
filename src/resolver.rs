use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::DrawSource;
use crate::database::DrawCache;
use crate::normalize::normalize_draw;
use crate::types::{Draw, ResolvedDraw};
use crate::utils::CurrencyStyle;

/// Fetch/cache/fallback policy in front of the results API.
///
/// * A specific draw is served from the cache when present; otherwise it is
///   fetched, stored and returned. A failed fetch is a miss.
/// * The latest draw always goes to the API first and falls back to the
///   highest cached draw when the API fails.
///
/// Errors never leave this type: callers get a draw or `None`.
pub struct Resolver {
    source: Arc<dyn DrawSource>,
    cache: DrawCache,
    currency: CurrencyStyle,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PrefetchSummary {
    pub already_cached: Vec<u32>,
    pub fetched: Vec<u32>,
    pub failed: Vec<u32>,
}

impl Resolver {
    pub fn new(source: Arc<dyn DrawSource>, cache: DrawCache, currency: CurrencyStyle) -> Self {
        Self {
            source,
            cache,
            currency,
        }
    }

    pub fn cache(&self) -> &DrawCache {
        &self.cache
    }

    pub async fn resolve(&self, number: Option<u32>) -> Option<ResolvedDraw> {
        let draw = match number {
            Some(n) => self.resolve_number(n).await,
            None => self.resolve_latest().await,
        }?;

        Some(normalize_draw(&draw, self.currency))
    }

    async fn resolve_number(&self, number: u32) -> Option<Draw> {
        if number == 0 {
            debug!("draw number 0 requested");
            return None;
        }

        match self.cache.get(number) {
            Ok(Some(draw)) => {
                debug!(number, "cache hit");
                return Some(draw);
            }
            Ok(None) => debug!(number, "cache miss"),
            Err(e) => warn!(number, error = %e, "cache lookup failed, asking the API"),
        }

        match self.source.fetch_by_number(number).await {
            Ok(draw) => {
                self.remember(&draw);
                Some(draw)
            }
            Err(e) => {
                warn!(number, error = %e, "draw unavailable");
                None
            }
        }
    }

    async fn resolve_latest(&self) -> Option<Draw> {
        match self.source.fetch_latest().await {
            Ok(draw) => {
                self.remember(&draw);
                return Some(draw);
            }
            Err(e) => warn!(error = %e, "latest draw unavailable from the API, trying the cache"),
        }

        match self.cache.latest() {
            Ok(Some(draw)) => {
                info!(number = draw.number, "serving latest draw from the cache");
                Some(draw)
            }
            Ok(None) => {
                debug!("cache is empty");
                None
            }
            Err(e) => {
                warn!(error = %e, "cache fallback failed");
                None
            }
        }
    }

    /// Best-effort insert; a failure is logged and otherwise ignored.
    fn remember(&self, draw: &Draw) {
        match self.cache.put(draw) {
            Ok(true) => info!(number = draw.number, "draw cached"),
            Ok(false) => debug!(number = draw.number, "draw already cached"),
            Err(e) => warn!(number = draw.number, error = %e, "failed to cache draw"),
        }
    }

    /// Fetches and stores every draw in `numbers` that is not cached yet,
    /// pausing `delay` between remote calls.
    pub async fn prefetch(&self, numbers: &[u32], delay: Duration) -> PrefetchSummary {
        let mut summary = PrefetchSummary::default();
        let mut first_call = true;

        for &number in numbers {
            if number == 0 {
                summary.failed.push(number);
                continue;
            }

            if matches!(self.cache.contains(number), Ok(true)) {
                summary.already_cached.push(number);
                continue;
            }

            if !first_call && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            first_call = false;

            match self.source.fetch_by_number(number).await {
                Ok(draw) => match self.cache.put(&draw) {
                    Ok(_) => summary.fetched.push(number),
                    Err(e) => {
                        warn!(number, error = %e, "failed to cache prefetched draw");
                        summary.failed.push(number);
                    }
                },
                Err(e) => {
                    warn!(number, error = %e, "prefetch failed");
                    summary.failed.push(number);
                }
            }
        }

        info!(
            cached = summary.already_cached.len(),
            fetched = summary.fetched.len(),
            failed = summary.failed.len(),
            "prefetch finished"
        );
        summary
    }
}
