use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

use crate::config::Settings;
use crate::domain::commodity::Commodity;
use crate::domain::params::TimeRange;
use crate::domain::region::Region;
use crate::domain::series::{
    CropHealthSeries, PriceSeries, Sourced, TradeFlowSeries, WeatherSeries,
};
use crate::ingest::error::FetchError;
use crate::ingest::provider::{MarketDataSource, RetryPolicy};
use crate::storage::cache::{CacheKey, MemoCache};
use crate::synth;
use crate::time::window::lookback_range;

/// An empty success counts as a failed attempt, so it is retried and then replaced like any
/// other failure.
async fn non_empty<T, F>(fetch: F) -> Result<Vec<T>, FetchError>
where
    F: Future<Output = Result<Vec<T>, FetchError>>,
{
    let rows = fetch.await?;
    if rows.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    Ok(rows)
}

/// Cached, retrying access to market data with synthetic fallback.
pub struct MarketDataService {
    source: Box<dyn MarketDataSource>,
    retry: RetryPolicy,
    cache: MemoCache,
}

impl MarketDataService {
    pub fn new(source: Box<dyn MarketDataSource>, retry: RetryPolicy, cache_ttl: Duration) -> Self {
        Self {
            source,
            retry,
            cache: MemoCache::new(cache_ttl),
        }
    }

    pub fn from_settings(source: Box<dyn MarketDataSource>, settings: &Settings) -> Self {
        Self::new(source, RetryPolicy::from_settings(settings), settings.cache_ttl)
    }

    pub fn provider_name(&self) -> &'static str {
        self.source.provider_name()
    }

    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    pub async fn price_history(
        &self,
        commodity: &Commodity,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Sourced<PriceSeries>> {
        let key = CacheKey::new("price_history", [commodity.ticker.as_str(), range.as_str()]);
        self.cache
            .get_or_insert_with(key, now, || async {
                let live = self
                    .retry
                    .run("price_history", || {
                        non_empty(self.source.fetch_price_history(&commodity.ticker, range))
                    })
                    .await;
                match live {
                    Ok(series) => Sourced::live(series),
                    Err(err) => {
                        tracing::warn!(ticker = %commodity.ticker, %range, error = %err, "price fetch failed; using synthetic quotes");
                        Sourced::synthetic(synth::price_history(
                            &commodity.ticker,
                            range,
                            commodity.reference_price,
                            now.date_naive(),
                        ))
                    }
                }
            })
            .await
    }

    pub async fn weather(
        &self,
        region: Region,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Sourced<WeatherSeries>> {
        let key = CacheKey::new("weather", [region.name()]);
        let (start, end) = lookback_range(now.date_naive());
        self.cache
            .get_or_insert_with(key, now, || async {
                let live = self
                    .retry
                    .run("weather", || {
                        non_empty(self.source.fetch_weather(region.coordinates(), start, end))
                    })
                    .await;
                match live {
                    Ok(series) => Sourced::live(series),
                    Err(err) => {
                        tracing::warn!(%region, error = %err, "weather fetch failed; using synthetic series");
                        Sourced::synthetic(synth::weather(region, end))
                    }
                }
            })
            .await
    }

    pub async fn crop_health(
        &self,
        region: Region,
        commodity: &Commodity,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Sourced<CropHealthSeries>> {
        let key = CacheKey::new("crop_health", [region.name(), commodity.name.as_str()]);
        let (start, end) = lookback_range(now.date_naive());
        self.cache
            .get_or_insert_with(key, now, || async {
                let live = self
                    .retry
                    .run("crop_health", || {
                        non_empty(
                            self.source
                                .fetch_crop_health(region.coordinates(), start, end),
                        )
                    })
                    .await;
                match live {
                    Ok(series) => Sourced::live(series),
                    Err(err) => {
                        tracing::warn!(%region, commodity = %commodity.name, error = %err, "agronomic fetch failed; using synthetic series");
                        Sourced::synthetic(synth::crop_health(region, &commodity.name, end))
                    }
                }
            })
            .await
    }

    /// No public trade-flow source is consumed; the series is always synthetic but memoized
    /// like the others.
    pub async fn trade_flow(
        &self,
        commodity: &Commodity,
        region: Region,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Sourced<TradeFlowSeries>> {
        let key = CacheKey::new("trade_flow", [commodity.name.as_str(), region.name()]);
        self.cache
            .get_or_insert_with(key, now, || async {
                Sourced::synthetic(synth::trade_flow(&commodity.name, region, now.date_naive()))
            })
            .await
    }
}
