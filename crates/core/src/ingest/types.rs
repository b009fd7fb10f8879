//! Wire shapes of the live providers and their conversion into domain series.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::domain::series::{
    CropHealthPoint, CropHealthSeries, MonthlyBuckets, PricePoint, PriceSeries, WeatherPoint,
    WeatherSeries,
};
use crate::ingest::error::FetchError;

// Price quotes (chart endpoint).

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Daily OHLCV rows; rows without a close are dropped.
    pub fn into_price_series(self) -> Result<PriceSeries, FetchError> {
        if let Some(err) = self.chart.error.filter(|e| !e.is_null()) {
            return Err(FetchError::Malformed(format!("chart error: {err}")));
        }
        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Err(FetchError::EmptyResult);
        };
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();
        let mut out = PriceSeries::with_capacity(result.timestamp.len());
        for (i, ts) in result.timestamp.iter().enumerate() {
            let Some(close) = at(&quote.close, i).filter(|c| c.is_finite()) else {
                continue;
            };
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            out.push(PricePoint {
                date,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0),
            });
        }

        if out.is_empty() {
            return Err(FetchError::EmptyResult);
        }
        Ok(out)
    }
}

// Hourly weather archive.

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveResponse {
    #[serde(default)]
    pub hourly: Option<HourlyBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub rain: Vec<Option<f64>>,
}

impl ArchiveResponse {
    /// Monthly mean temperature and monthly rain total.
    pub fn into_weather_series(self) -> Result<WeatherSeries, FetchError> {
        let Some(hourly) = self.hourly else {
            return Err(FetchError::EmptyResult);
        };

        let mut temps = MonthlyBuckets::default();
        let mut rain = MonthlyBuckets::default();
        for (i, raw) in hourly.time.iter().enumerate() {
            let date = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
                .map_err(|e| FetchError::Malformed(format!("bad hourly timestamp {raw:?}: {e}")))?
                .date();
            if let Some(t) = hourly.temperature_2m.get(i).copied().flatten() {
                temps.push(date, t);
            }
            if let Some(r) = hourly.rain.get(i).copied().flatten() {
                rain.push(date, r);
            }
        }

        let rain_totals = rain.sums();
        let out: WeatherSeries = temps
            .means()
            .into_iter()
            .map(|(date, temperature)| WeatherPoint {
                date,
                temperature,
                rainfall: rain_totals.get(&date).copied().unwrap_or(0.0).max(0.0),
            })
            .collect();

        if out.is_empty() {
            return Err(FetchError::EmptyResult);
        }
        Ok(out)
    }
}

// Daily agronomic point data.

/// Marker the agronomic provider uses for missing values.
pub const AGRO_FILL_VALUE: f64 = -999.0;

#[derive(Debug, Clone, Deserialize)]
pub struct PowerResponse {
    pub properties: PowerProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PowerProperties {
    pub parameter: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PowerResponse {
    /// Monthly crop indices derived from daily temperature (T2M) and precipitation (PRECTOTCORR).
    pub fn into_crop_health_series(self) -> Result<CropHealthSeries, FetchError> {
        let params = self.properties.parameter;
        let temps = params
            .get("T2M")
            .ok_or_else(|| FetchError::Malformed("missing T2M".to_string()))?;
        let precip = params
            .get("PRECTOTCORR")
            .ok_or_else(|| FetchError::Malformed("missing PRECTOTCORR".to_string()))?;

        let mut temp_buckets = MonthlyBuckets::default();
        let mut precip_buckets = MonthlyBuckets::default();
        for (key, value) in temps {
            if let Some(date) = parse_power_date(key, *value)? {
                temp_buckets.push(date, *value);
            }
        }
        for (key, value) in precip {
            if let Some(date) = parse_power_date(key, *value)? {
                precip_buckets.push(date, *value);
            }
        }

        let precip_means = precip_buckets.means();
        let out: CropHealthSeries = temp_buckets
            .means()
            .into_iter()
            .filter_map(|(date, temp)| {
                let precip = precip_means.get(&date).copied()?;
                Some(crop_indices(date, temp, precip))
            })
            .collect();

        if out.is_empty() {
            return Err(FetchError::EmptyResult);
        }
        Ok(out)
    }
}

fn parse_power_date(key: &str, value: f64) -> Result<Option<NaiveDate>, FetchError> {
    if value <= AGRO_FILL_VALUE {
        return Ok(None);
    }
    NaiveDate::parse_from_str(key, "%Y%m%d")
        .map(Some)
        .map_err(|e| FetchError::Malformed(format!("bad daily key {key:?}: {e}")))
}

/// Maps monthly mean temperature (°C) and mean daily precipitation (mm/day) to crop indices.
pub fn crop_indices(date: NaiveDate, mean_temp: f64, mean_precip: f64) -> CropHealthPoint {
    let soil_moisture = (mean_precip / 10.0).clamp(0.0, 1.0);
    let heat_penalty = 0.02 * (mean_temp - 30.0).max(0.0);
    let ndvi = (0.35 + 0.5 * soil_moisture - heat_penalty).clamp(0.0, 1.0);
    let crop_stress = (100.0 * (1.0 - ndvi) * (1.0 - 0.5 * soil_moisture)).clamp(0.0, 100.0);
    CropHealthPoint {
        date,
        ndvi,
        soil_moisture,
        crop_stress,
    }
}
