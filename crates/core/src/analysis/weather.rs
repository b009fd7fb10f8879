use serde::{Deserialize, Serialize};

use super::{recent_vs_history, INSUFFICIENT_DATA};
use crate::domain::params::UserType;
use crate::domain::region::Region;
use crate::domain::series::{pct_change, WeatherPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherOutlook {
    Favorable,
    Stress,
    SignificantStress,
}

#[derive(Debug, Clone, Copy)]
pub struct WeatherThresholds {
    /// Absolute temperature anomaly (°C) considered large.
    pub temperature_c: f64,
    /// Absolute rainfall anomaly (%) considered large.
    pub rainfall_pct: f64,
}

impl Default for WeatherThresholds {
    fn default() -> Self {
        Self {
            temperature_c: 2.0,
            rainfall_pct: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherAssessment {
    pub temperature_anomaly: f64,
    pub rainfall_anomaly_pct: f64,
    pub outlook: WeatherOutlook,
}

pub fn assess_weather(
    series: &[WeatherPoint],
    thresholds: &WeatherThresholds,
) -> Option<WeatherAssessment> {
    let temps: Vec<f64> = series.iter().map(|p| p.temperature).collect();
    let rain: Vec<f64> = series.iter().map(|p| p.rainfall).collect();
    let (temp_hist, temp_recent) = recent_vs_history(&temps)?;
    let (rain_hist, rain_recent) = recent_vs_history(&rain)?;

    let temperature_anomaly = temp_recent - temp_hist;
    let rainfall_anomaly_pct = pct_change(rain_hist, rain_recent);

    let large = [
        temperature_anomaly.abs() > thresholds.temperature_c,
        rainfall_anomaly_pct.abs() > thresholds.rainfall_pct,
    ]
    .into_iter()
    .filter(|b| *b)
    .count();

    let outlook = match large {
        0 => WeatherOutlook::Favorable,
        1 => WeatherOutlook::Stress,
        _ => WeatherOutlook::SignificantStress,
    };

    Some(WeatherAssessment {
        temperature_anomaly,
        rainfall_anomaly_pct,
        outlook,
    })
}

pub fn render_weather(region: Region, assessment: &WeatherAssessment, user_type: UserType) -> String {
    let label = match assessment.outlook {
        WeatherOutlook::Favorable => "favorable conditions",
        WeatherOutlook::Stress => "weather stress",
        WeatherOutlook::SignificantStress => "significant weather stress",
    };
    let action = match (assessment.outlook, user_type) {
        (WeatherOutlook::Favorable, UserType::Buyer) => "supply looks steady, so standard purchasing is appropriate",
        (WeatherOutlook::Favorable, UserType::Seller) => "expect normal yields and plan sales as usual",
        (WeatherOutlook::Stress, UserType::Buyer) => "monitor supply closely and consider securing volumes early",
        (WeatherOutlook::Stress, UserType::Seller) => "yields may tighten, so consider pricing in a weather premium",
        (WeatherOutlook::SignificantStress, UserType::Buyer) => "expect supply disruptions and line up alternative sources now",
        (WeatherOutlook::SignificantStress, UserType::Seller) => "reduced supply could support prices, so hold back uncommitted volumes",
    };
    format!(
        "{region} is experiencing {label} (temperature anomaly {:+.1}°C, rainfall anomaly {:+.0}%); {action}.",
        assessment.temperature_anomaly, assessment.rainfall_anomaly_pct
    )
}

pub fn summarize_weather(
    region: Region,
    series: &[WeatherPoint],
    user_type: UserType,
    thresholds: &WeatherThresholds,
) -> String {
    match assess_weather(series, thresholds) {
        Some(a) => render_weather(region, &a, user_type),
        None => INSUFFICIENT_DATA.to_string(),
    }
}
