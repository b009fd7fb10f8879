use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPoint {
    pub date: NaiveDate,
    /// Monthly mean air temperature, °C.
    pub temperature: f64,
    /// Monthly rainfall total, mm.
    pub rainfall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropHealthPoint {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub soil_moisture: f64,
    pub crop_stress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFlowPoint {
    pub date: NaiveDate,
    pub volume: f64,
    pub price: f64,
}

pub type PriceSeries = Vec<PricePoint>;
pub type WeatherSeries = Vec<WeatherPoint>;
pub type CropHealthSeries = Vec<CropHealthPoint>;
pub type TradeFlowSeries = Vec<TradeFlowPoint>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Synthetic,
}

/// A series together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub origin: DataOrigin,
    pub data: T,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self {
            origin: DataOrigin::Live,
            data,
        }
    }

    pub fn synthetic(data: T) -> Self {
        Self {
            origin: DataOrigin::Synthetic,
            data,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == DataOrigin::Synthetic
    }
}

/// Groups dated samples by calendar month. Keys are the last day of each month.
#[derive(Debug, Default)]
pub struct MonthlyBuckets {
    buckets: BTreeMap<NaiveDate, Vec<f64>>,
}

impl MonthlyBuckets {
    pub fn push(&mut self, date: NaiveDate, value: f64) {
        if !value.is_finite() {
            return;
        }
        if let Some(key) = crate::time::window::month_end(date) {
            self.buckets.entry(key).or_default().push(value);
        }
    }

    pub fn means(&self) -> BTreeMap<NaiveDate, f64> {
        self.buckets
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (*k, v.iter().sum::<f64>() / v.len() as f64))
            .collect()
    }

    pub fn sums(&self) -> BTreeMap<NaiveDate, f64> {
        self.buckets
            .iter()
            .map(|(k, v)| (*k, v.iter().sum::<f64>()))
            .collect()
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percent change from `base` to `value`. A zero base yields 0 when unchanged and ±100 otherwise.
pub fn pct_change(base: f64, value: f64) -> f64 {
    if base == 0.0 {
        if value == 0.0 {
            return 0.0;
        }
        return 100.0_f64.copysign(value);
    }
    (value - base) / base.abs() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn monthly_buckets_key_by_month_end() {
        let mut b = MonthlyBuckets::default();
        b.push(d(2024, 2, 1), 1.0);
        b.push(d(2024, 2, 20), 3.0);
        b.push(d(2024, 3, 5), 10.0);
        b.push(d(2024, 3, 6), f64::NAN);

        let means = b.means();
        assert_eq!(means.get(&d(2024, 2, 29)).copied(), Some(2.0));
        assert_eq!(means.get(&d(2024, 3, 31)).copied(), Some(10.0));

        let sums = b.sums();
        assert_eq!(sums.get(&d(2024, 2, 29)).copied(), Some(4.0));
    }

    #[test]
    fn pct_change_handles_zero_base() {
        assert_eq!(pct_change(0.0, 0.0), 0.0);
        assert_eq!(pct_change(0.0, 5.0), 100.0);
        assert_eq!(pct_change(0.0, -5.0), -100.0);
        assert!((pct_change(100.0, 110.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
