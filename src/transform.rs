//! Render-time series transforms. Nothing here is persisted.

use chrono::Months;
use serde::{Deserialize, Serialize};

use crate::types::SeriesPoint;

/// Period-over-period change of a level series.
///
/// `out[i] = level[i + 1] - level[i]`, dated on the later point; always one
/// point shorter than the input (empty for fewer than two points).
pub fn delta_series(level: &[SeriesPoint]) -> Vec<SeriesPoint> {
    level
        .windows(2)
        .map(|w| SeriesPoint::new(w[1].date.clone(), w[1].value - w[0].value))
        .collect()
}

/// Keep points dated within `years` of the series' own last date.
///
/// The anchor is the last point, not the wall clock. Returns `None` (leave
/// the data alone) when the series is empty or its last date does not parse.
pub fn trailing_window(data: &[SeriesPoint], years: u32) -> Option<Vec<SeriesPoint>> {
    let anchor = data.last()?.parsed_date()?;
    let cutoff = anchor.checked_sub_months(Months::new(years.saturating_mul(12)))?;
    Some(
        data.iter()
            .filter(|p| p.parsed_date().is_some_and(|d| d >= cutoff))
            .cloned()
            .collect(),
    )
}

/// Latest vs. prior observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekOverWeek {
    pub last: Option<f64>,
    pub prev: Option<f64>,
    pub delta: Option<f64>,
    /// Undefined when `prev` is exactly zero.
    pub pct: Option<f64>,
}

pub fn week_over_week(data: &[SeriesPoint]) -> WeekOverWeek {
    let last = data.last().map(|p| p.value);
    let prev = data.len().checked_sub(2).map(|i| data[i].value);
    let (Some(l), Some(p)) = (last, prev) else {
        return WeekOverWeek {
            last,
            prev,
            ..Default::default()
        };
    };
    let delta = l - p;
    let pct = if p == 0.0 { None } else { Some(delta / p * 100.0) };
    WeekOverWeek {
        last,
        prev,
        delta: Some(delta),
        pct,
    }
}
