//! Recent-versus-historical trend summaries for each metric.
//!
//! Every summarizer splits its series into the last [`RECENT_WINDOW`] points and everything
//! before them, classifies the difference against thresholds and renders one role-aware
//! sentence. Series too short for that comparison yield [`INSUFFICIENT_DATA`].

pub mod crop_health;
pub mod price;
pub mod trade_flow;
pub mod weather;

use crate::domain::series::mean;

pub const RECENT_WINDOW: usize = 3;

pub const INSUFFICIENT_DATA: &str = "There is insufficient data for a trend comparison.";

/// `(historical_mean, recent_mean)`, or `None` when there is no history before the recent window.
pub(crate) fn recent_vs_history(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() <= RECENT_WINDOW {
        return None;
    }
    let (history, recent) = values.split_at(values.len() - RECENT_WINDOW);
    Some((mean(history)?, mean(recent)?))
}
