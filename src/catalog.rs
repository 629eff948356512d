//! Compiled-in series catalogue shared by the fetcher and the dashboard.

use crate::types::{Frequency, SeriesId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TERM_PREMIUM: &str = "THREEFYTP10";
pub const TEN_YEAR_YIELD: &str = "DGS10";
pub const VIX: &str = "VIXCLS";
pub const FEDERAL_DEBT: &str = "GFDEBTN";

pub const MAX_POINTS: usize = 166;

/// What the fetcher retrieves and how.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchPlan {
    pub series: Vec<SeriesId>,
    /// Series that must not use the default frequency.
    pub frequency_overrides: BTreeMap<SeriesId, Frequency>,
    pub default_frequency: Frequency,
    pub max_points: usize,
}

impl Default for FetchPlan {
    fn default() -> Self {
        let series = [
            TERM_PREMIUM,
            TEN_YEAR_YIELD,
            "DGS30",
            "DFII10",
            "T10YIE",
            "T10Y2Y",
            FEDERAL_DEBT,
            VIX,
        ]
        .into_iter()
        .map(SeriesId::from)
        .collect();
        // GFDEBTN is quarterly; the upstream rejects a weekly resample for it.
        let frequency_overrides =
            BTreeMap::from([(SeriesId::from(FEDERAL_DEBT), Frequency::Native)]);
        Self {
            series,
            frequency_overrides,
            default_frequency: Frequency::weekly(),
            max_points: MAX_POINTS,
        }
    }
}

impl FetchPlan {
    pub fn frequency_for(&self, id: &SeriesId) -> Frequency {
        self.frequency_overrides
            .get(id)
            .cloned()
            .unwrap_or_else(|| self.default_frequency.clone())
    }
}

/// The three series feeding the advisory signal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignalSeries {
    pub term_premium: SeriesId,
    pub ten_year_yield: SeriesId,
    pub vix: SeriesId,
}

/// Level series that gets a trailing window and a delta overlay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeltaOverlay {
    pub series: SeriesId,
    pub trailing_years: u32,
    pub label: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Card order; each entry is `(id, display name)`.
    pub catalog: Vec<(SeriesId, String)>,
    pub signal: SignalSeries,
    pub overlay: DeltaOverlay,
    pub table_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let catalog = [
            (TERM_PREMIUM, "Term Premium (10Y)"),
            (TEN_YEAR_YIELD, "10Y Treasury Yield"),
            ("DGS30", "30Y Treasury Yield"),
            ("DFII10", "10Y Real Yield"),
            ("T10YIE", "10Y Inflation Expectation"),
            ("T10Y2Y", "10Y-2Y Spread"),
            (FEDERAL_DEBT, "US Federal Debt"),
            (VIX, "VIX"),
        ]
        .into_iter()
        .map(|(id, name)| (SeriesId::from(id), name.to_string()))
        .collect();

        Self {
            catalog,
            signal: SignalSeries {
                term_premium: TERM_PREMIUM.into(),
                ten_year_yield: TEN_YEAR_YIELD.into(),
                vix: VIX.into(),
            },
            overlay: DeltaOverlay {
                series: FEDERAL_DEBT.into(),
                trailing_years: 3,
                label: "Debt change (per period)".to_string(),
            },
            table_rows: 40,
        }
    }
}

impl DashboardConfig {
    /// Display name, or the raw identifier when none is configured.
    pub fn display_name<'a>(&'a self, id: &'a SeriesId) -> &'a str {
        self.catalog
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(_, name)| name.as_str())
            .unwrap_or(id.as_str())
    }
}
