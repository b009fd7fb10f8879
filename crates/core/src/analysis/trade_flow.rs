use serde::{Deserialize, Serialize};

use super::{recent_vs_history, INSUFFICIENT_DATA};
use crate::domain::params::UserType;
use crate::domain::series::{pct_change, TradeFlowPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Stable,
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Copy)]
pub struct TradeFlowThresholds {
    pub stable_volume_pct: f64,
    pub stable_price_pct: f64,
    pub increasing_volume_pct: f64,
}

impl Default for TradeFlowThresholds {
    fn default() -> Self {
        Self {
            stable_volume_pct: 5.0,
            stable_price_pct: 3.0,
            increasing_volume_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeFlowAssessment {
    pub volume_change_pct: f64,
    pub price_change_pct: f64,
    pub direction: TradeDirection,
}

pub fn assess_trade_flow(
    series: &[TradeFlowPoint],
    thresholds: &TradeFlowThresholds,
) -> Option<TradeFlowAssessment> {
    let volumes: Vec<f64> = series.iter().map(|p| p.volume).collect();
    let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
    let (vol_hist, vol_recent) = recent_vs_history(&volumes)?;
    let (price_hist, price_recent) = recent_vs_history(&prices)?;

    let volume_change_pct = pct_change(vol_hist, vol_recent);
    let price_change_pct = pct_change(price_hist, price_recent);

    let direction = if volume_change_pct.abs() < thresholds.stable_volume_pct
        && price_change_pct.abs() < thresholds.stable_price_pct
    {
        TradeDirection::Stable
    } else if volume_change_pct > thresholds.increasing_volume_pct {
        TradeDirection::Increasing
    } else {
        TradeDirection::Decreasing
    };

    Some(TradeFlowAssessment {
        volume_change_pct,
        price_change_pct,
        direction,
    })
}

pub fn render_trade_flow(commodity: &str, assessment: &TradeFlowAssessment, user_type: UserType) -> String {
    let label = match assessment.direction {
        TradeDirection::Stable => "stable",
        TradeDirection::Increasing => "increasing",
        TradeDirection::Decreasing => "decreasing",
    };
    let action = match (assessment.direction, user_type) {
        (TradeDirection::Stable, UserType::Buyer) => "existing supply routes remain reliable",
        (TradeDirection::Stable, UserType::Seller) => "current export channels remain dependable",
        (TradeDirection::Increasing, UserType::Buyer) => "more offers in the market strengthen your negotiating position",
        (TradeDirection::Increasing, UserType::Seller) => "growing demand supports expanding shipments",
        (TradeDirection::Decreasing, UserType::Buyer) => "thinner flows may tighten availability, so confirm contracts early",
        (TradeDirection::Decreasing, UserType::Seller) => "softer flows call for looking at alternative destinations",
    };
    format!(
        "{commodity} trade flows are {label} (volume {:+.1}%, price {:+.1}%); {action}.",
        assessment.volume_change_pct, assessment.price_change_pct
    )
}

pub fn summarize_trade_flow(
    commodity: &str,
    series: &[TradeFlowPoint],
    user_type: UserType,
    thresholds: &TradeFlowThresholds,
) -> String {
    match assess_trade_flow(series, thresholds) {
        Some(a) => render_trade_flow(commodity, &a, user_type),
        None => INSUFFICIENT_DATA.to_string(),
    }
}
