use chrono::NaiveDate;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

use super::seed::rng_from_keys;
use crate::domain::params::TimeRange;
use crate::domain::region::Region;
use crate::domain::series::{
    CropHealthPoint, CropHealthSeries, PricePoint, PriceSeries, TradeFlowPoint, TradeFlowSeries,
    WeatherPoint, WeatherSeries,
};
use crate::time::window::{monthly_timestamps, LOOKBACK_MONTHS};

fn noise(rng: &mut impl Rng, sd: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    z * sd
}

/// 12-month seasonal cycle.
fn season(i: usize, phase: f64) -> f64 {
    (2.0 * PI * i as f64 / 12.0 + phase).sin()
}

/// Seeded from the region only.
pub fn weather(region: Region, anchor: NaiveDate) -> WeatherSeries {
    let mut rng = rng_from_keys(&[region.name()]);
    monthly_timestamps(anchor, LOOKBACK_MONTHS)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let temperature = 20.0 + 8.0 * season(i, 0.0) + 0.02 * i as f64 + noise(&mut rng, 1.5);
            let rainfall =
                (60.0 + 35.0 * season(i, PI / 2.0) - 0.1 * i as f64 + noise(&mut rng, 10.0)).max(0.0);
            WeatherPoint {
                date,
                temperature,
                rainfall,
            }
        })
        .collect()
}

/// Seeded from region and commodity.
pub fn crop_health(region: Region, commodity: &str, anchor: NaiveDate) -> CropHealthSeries {
    let mut rng = rng_from_keys(&[region.name(), commodity]);
    monthly_timestamps(anchor, LOOKBACK_MONTHS)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let ndvi = (0.6 + 0.15 * season(i, 0.0) - 0.002 * i as f64 + noise(&mut rng, 0.05))
                .clamp(0.0, 1.0);
            let soil_moisture = (0.4 + 0.12 * season(i, 1.0) - 0.001 * i as f64
                + noise(&mut rng, 0.04))
            .clamp(0.0, 1.0);
            let crop_stress = (30.0 - 12.0 * season(i, 0.0) + 0.25 * i as f64
                + noise(&mut rng, 5.0))
            .clamp(0.0, 100.0);
            CropHealthPoint {
                date,
                ndvi,
                soil_moisture,
                crop_stress,
            }
        })
        .collect()
}

/// Seeded from commodity and region.
pub fn trade_flow(commodity: &str, region: Region, anchor: NaiveDate) -> TradeFlowSeries {
    let mut rng = rng_from_keys(&[commodity, region.name()]);
    monthly_timestamps(anchor, LOOKBACK_MONTHS)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let volume =
                (1000.0 + 150.0 * season(i, 0.5) + 5.0 * i as f64 + noise(&mut rng, 60.0)).max(0.0);
            let price =
                (250.0 + 20.0 * season(i, 1.5) + 0.8 * i as f64 + noise(&mut rng, 6.0)).max(0.0);
            TradeFlowPoint {
                date,
                volume,
                price,
            }
        })
        .collect()
}

/// One OHLCV point per month of `range`, seeded from ticker and range label.
pub fn price_history(
    ticker: &str,
    range: TimeRange,
    reference_price: f64,
    anchor: NaiveDate,
) -> PriceSeries {
    let mut rng = rng_from_keys(&[ticker, range.as_str()]);
    let base = if reference_price.is_finite() && reference_price > 0.0 {
        reference_price
    } else {
        100.0
    };

    monthly_timestamps(anchor, range.months())
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let mid = base * (1.0 + 0.08 * season(i, 0.0) + 0.003 * i as f64)
                + noise(&mut rng, base * 0.02);
            let close = mid.max(0.0);
            let open = (close + noise(&mut rng, base * 0.01)).max(0.0);
            let spread = noise(&mut rng, base * 0.015).abs();
            let high = open.max(close) + spread;
            let low = (open.min(close) - spread).max(0.0);
            let volume = (50_000.0 + noise(&mut rng, 8_000.0)).max(0.0).round();
            PricePoint {
                date,
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}
