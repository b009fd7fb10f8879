use chrono::{Datelike, Duration, Months, NaiveDate};

/// Lookback used by weather, crop-health and trade-flow series.
pub const LOOKBACK_DAYS: i64 = 730;
pub const LOOKBACK_MONTHS: usize = 24;

pub fn month_end(date: NaiveDate) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    next.pred_opt()
}

/// `months` month-end dates, ascending, ending at the last month end on or before `anchor`.
pub fn monthly_timestamps(anchor: NaiveDate, months: usize) -> Vec<NaiveDate> {
    let Some(current_end) = month_end(anchor) else {
        return Vec::new();
    };
    let last = if current_end == anchor {
        anchor
    } else {
        match NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1).and_then(|d| d.pred_opt()) {
            Some(d) => d,
            None => return Vec::new(),
        }
    };

    let mut out = Vec::with_capacity(months);
    for back in (0..months).rev() {
        let shifted = NaiveDate::from_ymd_opt(last.year(), last.month(), 1)
            .and_then(|first| first.checked_sub_months(Months::new(back as u32)))
            .and_then(month_end);
        if let Some(d) = shifted {
            out.push(d);
        }
    }
    out
}

/// Inclusive (start, end) dates covering the fixed lookback window ending at `anchor`.
pub fn lookback_range(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    (anchor - Duration::days(LOOKBACK_DAYS), anchor)
}
