use serde::{Deserialize, Serialize};

use super::{recent_vs_history, INSUFFICIENT_DATA, RECENT_WINDOW};
use crate::domain::params::UserType;
use crate::domain::region::Region;
use crate::domain::series::{mean, CropHealthPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropCondition {
    Healthy,
    Variable,
    Stressed,
}

#[derive(Debug, Clone, Copy)]
pub struct CropHealthThresholds {
    pub healthy_max_stress: f64,
    pub variable_min_ndvi_trend: f64,
    pub variable_max_stress: f64,
}

impl Default for CropHealthThresholds {
    fn default() -> Self {
        Self {
            healthy_max_stress: 30.0,
            variable_min_ndvi_trend: -0.02,
            variable_max_stress: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropHealthAssessment {
    pub ndvi_trend: f64,
    pub stress_level: f64,
    pub condition: CropCondition,
}

pub fn assess_crop_health(
    series: &[CropHealthPoint],
    thresholds: &CropHealthThresholds,
) -> Option<CropHealthAssessment> {
    let ndvi: Vec<f64> = series.iter().map(|p| p.ndvi).collect();
    let (ndvi_hist, ndvi_recent) = recent_vs_history(&ndvi)?;
    let recent_stress: Vec<f64> = series[series.len() - RECENT_WINDOW..]
        .iter()
        .map(|p| p.crop_stress)
        .collect();
    let stress_level = mean(&recent_stress)?;
    let ndvi_trend = ndvi_recent - ndvi_hist;

    let condition = if ndvi_trend > 0.0 && stress_level < thresholds.healthy_max_stress {
        CropCondition::Healthy
    } else if ndvi_trend > thresholds.variable_min_ndvi_trend
        && stress_level < thresholds.variable_max_stress
    {
        CropCondition::Variable
    } else {
        CropCondition::Stressed
    };

    Some(CropHealthAssessment {
        ndvi_trend,
        stress_level,
        condition,
    })
}

pub fn render_crop_health(
    commodity: &str,
    region: Region,
    assessment: &CropHealthAssessment,
    user_type: UserType,
) -> String {
    let label = match assessment.condition {
        CropCondition::Healthy => "healthy",
        CropCondition::Variable => "variable",
        CropCondition::Stressed => "stressed",
    };
    let action = match (assessment.condition, user_type) {
        (CropCondition::Healthy, UserType::Buyer) => "ample supply should keep sourcing options open",
        (CropCondition::Healthy, UserType::Seller) => "expect competitive supply and price offers accordingly",
        (CropCondition::Variable, UserType::Buyer) => "keep a backup supplier ready in case yields disappoint",
        (CropCondition::Variable, UserType::Seller) => "watch yield reports before committing forward volumes",
        (CropCondition::Stressed, UserType::Buyer) => "secure supply early and diversify origins",
        (CropCondition::Stressed, UserType::Seller) => "tighter supply may support premiums for quality product",
    };
    format!(
        "{commodity} crops in {region} look {label} (NDVI trend {:+.3}, stress level {:.0}/100); {action}.",
        assessment.ndvi_trend, assessment.stress_level
    )
}

pub fn summarize_crop_health(
    commodity: &str,
    region: Region,
    series: &[CropHealthPoint],
    user_type: UserType,
    thresholds: &CropHealthThresholds,
) -> String {
    match assess_crop_health(series, thresholds) {
        Some(a) => render_crop_health(commodity, region, &a, user_type),
        None => INSUFFICIENT_DATA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(points: &[(f64, f64)]) -> Vec<CropHealthPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        points
            .iter()
            .enumerate()
            .map(|(i, (ndvi, stress))| CropHealthPoint {
                date: start + chrono::Duration::days(30 * i as i64),
                ndvi: *ndvi,
                soil_moisture: 0.5,
                crop_stress: *stress,
            })
            .collect()
    }

    fn condition(points: &[(f64, f64)]) -> CropCondition {
        assess_crop_health(&series(points), &CropHealthThresholds::default())
            .unwrap()
            .condition
    }

    #[test]
    fn improving_low_stress_is_healthy() {
        let pts = [(0.5, 20.0), (0.5, 20.0), (0.6, 20.0), (0.6, 20.0), (0.6, 20.0)];
        assert_eq!(condition(&pts), CropCondition::Healthy);
    }

    #[test]
    fn slight_decline_with_moderate_stress_is_variable() {
        let pts = [(0.6, 40.0), (0.6, 40.0), (0.59, 40.0), (0.59, 40.0), (0.59, 40.0)];
        assert_eq!(condition(&pts), CropCondition::Variable);

        // Improving NDVI but stress above the healthy cut-off.
        let pts = [(0.5, 35.0), (0.5, 35.0), (0.6, 35.0), (0.6, 35.0), (0.6, 35.0)];
        assert_eq!(condition(&pts), CropCondition::Variable);
    }

    #[test]
    fn steep_decline_or_high_stress_is_stressed() {
        let pts = [(0.7, 20.0), (0.7, 20.0), (0.6, 20.0), (0.6, 20.0), (0.6, 20.0)];
        assert_eq!(condition(&pts), CropCondition::Stressed);

        let pts = [(0.5, 60.0), (0.5, 60.0), (0.6, 60.0), (0.6, 60.0), (0.6, 60.0)];
        assert_eq!(condition(&pts), CropCondition::Stressed);
    }

    #[test]
    fn stress_level_uses_only_the_recent_window() {
        let pts = [(0.5, 90.0), (0.5, 90.0), (0.5, 10.0), (0.5, 20.0), (0.5, 30.0)];
        let a = assess_crop_health(&series(&pts), &CropHealthThresholds::default()).unwrap();
        assert!((a.stress_level - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_is_insufficient() {
        let s = summarize_crop_health(
            "Rice",
            Region::Asia,
            &[],
            UserType::Seller,
            &CropHealthThresholds::default(),
        );
        assert_eq!(s, INSUFFICIENT_DATA);
    }
}
