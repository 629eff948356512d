use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream series code, e.g. `DGS10`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub String);

impl SeriesId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(s: &str) -> Self {
        SeriesId(s.to_string())
    }
}

/// Sampling frequency requested from the upstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// No `frequency` parameter; the series' own cadence.
    #[serde(rename = "native")]
    Native,
    /// Upstream resamples to the given code (`w` for weekly).
    #[serde(untagged)]
    Resampled(String),
}

impl Frequency {
    pub fn weekly() -> Self {
        Frequency::Resampled("w".into())
    }

    /// Value sent as the `frequency` query parameter, if any.
    pub fn query_param(&self) -> Option<&str> {
        match self {
            Frequency::Resampled(code) => Some(code),
            Frequency::Native => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// ISO `YYYY-MM-DD`, kept as text so that malformed upstream dates survive
    /// storage and can be rejected where they matter.
    pub date: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSnapshot {
    pub series_id: SeriesId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<Frequency>,
    pub updated_at: DateTime<Utc>,
    pub points: usize,
    #[serde(default)]
    pub data: Vec<SeriesPoint>,
}

impl SeriesSnapshot {
    pub fn new(
        series_id: SeriesId,
        freq: Frequency,
        updated_at: DateTime<Utc>,
        data: Vec<SeriesPoint>,
    ) -> Self {
        Self {
            series_id,
            freq: Some(freq),
            updated_at,
            points: data.len(),
            data,
        }
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.data.last()
    }

    pub fn latest_value(&self) -> Option<f64> {
        self.latest().map(|p| p.value)
    }

    /// Replace `data` and keep `points` in step with it.
    pub fn set_data(&mut self, data: Vec<SeriesPoint>) {
        self.points = data.len();
        self.data = data;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    pub updated_at: DateTime<Utc>,
    pub series: Vec<SeriesId>,
}

/// Stable on-disk form: pretty-printed JSON plus a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}
