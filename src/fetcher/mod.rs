//! Batch job that mirrors the configured FRED series into snapshot files.
//!
//! Each series is fetched, normalised and written before the next one starts,
//! so a failure part-way through leaves every earlier snapshot on disk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::FetchPlan;
use crate::store::{self, WriteOutcome};
use crate::types::{Frequency, IndexDocument, SeriesId, SeriesSnapshot};

pub mod fred;
pub mod normalize;

pub use normalize::{normalize_observations, MISSING_SENTINEL};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing FRED API key (set FRED_API_KEY)")]
    MissingCredential,
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("FRED fetch failed: {series_id} {status} {body}")]
    Upstream {
        series_id: SeriesId,
        status: u16,
        body: String,
    },
    #[error("request for {series_id} failed: {source}")]
    Http {
        series_id: SeriesId,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response shape for {series_id}: {source}")]
    Decode {
        series_id: SeriesId,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialise {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One upstream observation; `value` is text because missing data arrives as `"."`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: String,
    pub value: String,
}

impl Observation {
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: value.into(),
        }
    }
}

/// Anything that can answer "the most recent `limit` observations, newest first".
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn observations(
        &self,
        series_id: &SeriesId,
        freq: &Frequency,
        limit: usize,
    ) -> Result<Vec<Observation>, FetchError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesOutcome {
    pub series_id: SeriesId,
    pub points: usize,
    pub outcome: WriteOutcome,
}

impl SeriesOutcome {
    /// One-line progress message, e.g. `Updated DGS10: 166 points`.
    pub fn progress_line(&self) -> String {
        match self.outcome {
            WriteOutcome::Written => format!("Updated {}: {} points", self.series_id, self.points),
            WriteOutcome::Unchanged => format!("No change {}", self.series_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchReport {
    pub series: Vec<SeriesOutcome>,
    pub index: WriteOutcome,
}

impl FetchReport {
    /// True when any snapshot or the index was rewritten.
    pub fn changed(&self) -> bool {
        self.index == WriteOutcome::Written
            || self
                .series
                .iter()
                .any(|s| s.outcome == WriteOutcome::Written)
    }
}

/// Fetch, normalise and persist every series in `plan`, then refresh the index.
///
/// Stops at the first error; snapshots written before it are kept.
pub async fn run_fetch(
    source: &dyn ObservationSource,
    plan: &FetchPlan,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<FetchReport, FetchError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| FetchError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let mut changed = false;
    let mut series = Vec::with_capacity(plan.series.len());

    for id in &plan.series {
        let freq = plan.frequency_for(id);
        let raw = source.observations(id, &freq, plan.max_points).await?;
        let data = normalize_observations(raw, plan.max_points);
        let snapshot = SeriesSnapshot::new(id.clone(), freq, now, data);
        let points = snapshot.points;

        let outcome = store::persist_snapshot(out_dir, &snapshot).await?;
        changed |= outcome == WriteOutcome::Written;
        let done = SeriesOutcome {
            series_id: id.clone(),
            points,
            outcome,
        };
        tracing::info!(series_id = %id, points, "{}", done.progress_line());
        series.push(done);
    }

    let index = IndexDocument {
        updated_at: now,
        series: plan.series.clone(),
    };
    let index_outcome = store::persist_index(out_dir, &index, changed).await?;
    tracing::debug!(?index_outcome, "index refreshed");

    Ok(FetchReport {
        series,
        index: index_outcome,
    })
}
