use serde::{Deserialize, Serialize};

use super::INSUFFICIENT_DATA;
use crate::domain::params::UserType;
use crate::domain::series::{pct_change, PricePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    StrongUp,
    ModerateUp,
    Stable,
    ModerateDown,
    StrongDown,
}

#[derive(Debug, Clone, Copy)]
pub struct PriceThresholds {
    pub strong_pct: f64,
    pub moderate_pct: f64,
}

impl Default for PriceThresholds {
    fn default() -> Self {
        Self {
            strong_pct: 10.0,
            moderate_pct: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAssessment {
    pub change_pct: f64,
    pub trend: PriceTrend,
}

/// Percent change of the close over the last quarter of the series.
pub fn assess_price(series: &[PricePoint], thresholds: &PriceThresholds) -> Option<PriceAssessment> {
    if series.len() < 2 {
        return None;
    }
    let lookback = (series.len() / 4).max(1);
    let last = series[series.len() - 1].close;
    let base = series[series.len() - 1 - lookback].close;
    let change_pct = pct_change(base, last);

    let trend = if change_pct > thresholds.strong_pct {
        PriceTrend::StrongUp
    } else if change_pct > thresholds.moderate_pct {
        PriceTrend::ModerateUp
    } else if change_pct < -thresholds.strong_pct {
        PriceTrend::StrongDown
    } else if change_pct < -thresholds.moderate_pct {
        PriceTrend::ModerateDown
    } else {
        PriceTrend::Stable
    };

    Some(PriceAssessment { change_pct, trend })
}

pub fn render_price(commodity: &str, assessment: &PriceAssessment, user_type: UserType) -> String {
    let label = match assessment.trend {
        PriceTrend::StrongUp => "a strong upward",
        PriceTrend::ModerateUp => "a moderate upward",
        PriceTrend::Stable => "a stable",
        PriceTrend::ModerateDown => "a moderate downward",
        PriceTrend::StrongDown => "a strong downward",
    };
    let action = match (assessment.trend, user_type) {
        (PriceTrend::StrongUp, UserType::Buyer) => "consider locking in forward contracts before further increases",
        (PriceTrend::StrongUp, UserType::Seller) => "this is a favorable window to sell forward at elevated prices",
        (PriceTrend::ModerateUp, UserType::Buyer) => "consider staggering purchases to average out rising costs",
        (PriceTrend::ModerateUp, UserType::Seller) => "consider holding part of your inventory to capture further gains",
        (PriceTrend::Stable, UserType::Buyer) => "maintain your regular procurement schedule",
        (PriceTrend::Stable, UserType::Seller) => "maintain your regular sales schedule",
        (PriceTrend::ModerateDown, UserType::Buyer) => "consider increasing purchase volumes while prices ease",
        (PriceTrend::ModerateDown, UserType::Seller) => "consider hedging part of upcoming sales against further declines",
        (PriceTrend::StrongDown, UserType::Buyer) => "this is an opportunity to build inventory at lower prices",
        (PriceTrend::StrongDown, UserType::Seller) => "consider hedging and diversifying into new markets",
    };
    format!(
        "{commodity} prices show {label} trend over the last quarter ({:+.1}%); as a {}, {action}.",
        assessment.change_pct,
        user_type.as_str().to_lowercase()
    )
}

pub fn summarize_price(
    commodity: &str,
    series: &[PricePoint],
    user_type: UserType,
    thresholds: &PriceThresholds,
) -> String {
    match assess_price(series, thresholds) {
        Some(a) => render_price(commodity, &a, user_type),
        None => INSUFFICIENT_DATA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn closes(values: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: *c,
                high: *c,
                low: *c,
                close: *c,
                volume: 0.0,
            })
            .collect()
    }

    fn trend(values: &[f64]) -> PriceTrend {
        assess_price(&closes(values), &PriceThresholds::default())
            .unwrap()
            .trend
    }

    #[test]
    fn compares_against_the_start_of_the_last_quarter() {
        // 8 points: lookback 2, base is index 5.
        let a = assess_price(
            &closes(&[1.0, 1.0, 1.0, 1.0, 1.0, 100.0, 90.0, 112.0]),
            &PriceThresholds::default(),
        )
        .unwrap();
        assert!((a.change_pct - 12.0).abs() < 1e-9);
        assert_eq!(a.trend, PriceTrend::StrongUp);
    }

    #[test]
    fn threshold_buckets() {
        assert_eq!(trend(&[100.0, 111.0]), PriceTrend::StrongUp);
        assert_eq!(trend(&[100.0, 105.0]), PriceTrend::ModerateUp);
        assert_eq!(trend(&[100.0, 103.0]), PriceTrend::Stable);
        assert_eq!(trend(&[100.0, 97.0]), PriceTrend::Stable);
        assert_eq!(trend(&[100.0, 95.0]), PriceTrend::ModerateDown);
        assert_eq!(trend(&[100.0, 85.0]), PriceTrend::StrongDown);
    }

    #[test]
    fn short_series_is_insufficient() {
        let t = PriceThresholds::default();
        assert_eq!(summarize_price("Wheat", &[], UserType::Buyer, &t), INSUFFICIENT_DATA);
        assert_eq!(
            summarize_price("Wheat", &closes(&[1.0]), UserType::Seller, &t),
            INSUFFICIENT_DATA
        );
    }

    #[test]
    fn sentence_depends_on_role() {
        let t = PriceThresholds::default();
        let s = closes(&[100.0, 120.0]);
        let buyer = summarize_price("Wheat", &s, UserType::Buyer, &t);
        let seller = summarize_price("Wheat", &s, UserType::Seller, &t);
        assert!(buyer.starts_with("Wheat prices show a strong upward trend"));
        assert!(buyer.contains("(+20.0%)"));
        assert!(buyer.contains("as a buyer"));
        assert!(seller.contains("as a seller"));
        assert_ne!(buyer, seller);
    }
}
