//! Conditional writes of snapshot and index files.
//!
//! A file is rewritten only when its pretty-printed form differs from what is
//! already on disk. `updatedAt` is excluded from that comparison by carrying
//! the stored timestamp over, so refetching identical data touches nothing.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::fetcher::FetchError;
use crate::types::{to_pretty_json, IndexDocument, SeriesId, SeriesSnapshot};

pub const INDEX_FILE: &str = "_index.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

pub fn snapshot_path(dir: &Path, id: &SeriesId) -> PathBuf {
    dir.join(format!("{id}.json"))
}

pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Documents whose `updatedAt` does not count as a content change.
pub trait Stamped {
    fn stamp(&self) -> DateTime<Utc>;
    fn with_stamp(&self, ts: DateTime<Utc>) -> Self;
}

impl Stamped for SeriesSnapshot {
    fn stamp(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn with_stamp(&self, ts: DateTime<Utc>) -> Self {
        Self {
            updated_at: ts,
            ..self.clone()
        }
    }
}

impl Stamped for IndexDocument {
    fn stamp(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn with_stamp(&self, ts: DateTime<Utc>) -> Self {
        Self {
            updated_at: ts,
            ..self.clone()
        }
    }
}

pub async fn persist_snapshot(
    dir: &Path,
    snapshot: &SeriesSnapshot,
) -> Result<WriteOutcome, FetchError> {
    persist(&snapshot_path(dir, &snapshot.series_id), snapshot, false).await
}

/// `force` rewrites the index with the fresh timestamp; used when any
/// snapshot changed in the same run.
pub async fn persist_index(
    dir: &Path,
    index: &IndexDocument,
    force: bool,
) -> Result<WriteOutcome, FetchError> {
    persist(&index_path(dir), index, force).await
}

async fn persist<T>(path: &Path, next: &T, force: bool) -> Result<WriteOutcome, FetchError>
where
    T: Stamped + Serialize + DeserializeOwned,
{
    let prev = read_existing(path).await?;
    let fresh = render(path, next)?;

    if !force {
        // Same content under the old timestamp means nothing to do.
        if let Some(prev_doc) = prev.as_deref().and_then(|s| serde_json::from_str::<T>(s).ok()) {
            let restamped = render(path, &next.with_stamp(prev_doc.stamp()))?;
            if prev.as_deref() == Some(restamped.as_str()) {
                return Ok(WriteOutcome::Unchanged);
            }
        }
    }

    if prev.as_deref() == Some(fresh.as_str()) {
        return Ok(WriteOutcome::Unchanged);
    }

    tokio::fs::write(path, fresh.as_bytes())
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(WriteOutcome::Written)
}

async fn read_existing(path: &Path) -> Result<Option<String>, FetchError> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FetchError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn render<T: Serialize>(path: &Path, doc: &T) -> Result<String, FetchError> {
    to_pretty_json(doc).map_err(|source| FetchError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Frequency, SeriesPoint};
    use chrono::TimeZone;

    fn snap(ts: DateTime<Utc>, values: &[f64]) -> SeriesSnapshot {
        let data = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(format!("2024-01-{:02}", i + 1), *v))
            .collect();
        SeriesSnapshot::new("DGS10".into(), Frequency::weekly(), ts, data)
    }

    #[tokio::test]
    async fn first_write_then_unchanged_despite_new_timestamp() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let t0 = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap();

        assert_eq!(
            persist_snapshot(tmp.path(), &snap(t0, &[1.0, 2.0])).await.unwrap(),
            WriteOutcome::Written
        );
        let before = std::fs::read_to_string(snapshot_path(tmp.path(), &"DGS10".into())).unwrap();

        assert_eq!(
            persist_snapshot(tmp.path(), &snap(t1, &[1.0, 2.0])).await.unwrap(),
            WriteOutcome::Unchanged
        );
        let after = std::fs::read_to_string(snapshot_path(tmp.path(), &"DGS10".into())).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn changed_data_is_written_with_new_timestamp() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let t0 = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap();

        persist_snapshot(tmp.path(), &snap(t0, &[1.0])).await.unwrap();
        assert_eq!(
            persist_snapshot(tmp.path(), &snap(t1, &[1.0, 2.0])).await.unwrap(),
            WriteOutcome::Written
        );

        let raw = std::fs::read_to_string(snapshot_path(tmp.path(), &"DGS10".into())).unwrap();
        let stored: SeriesSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.updated_at, t1);
        assert_eq!(stored.points, 2);
    }

    #[tokio::test]
    async fn forced_index_write_refreshes_timestamp() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let t0 = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap();
        let idx = |ts| IndexDocument {
            updated_at: ts,
            series: vec!["DGS10".into()],
        };

        assert_eq!(
            persist_index(tmp.path(), &idx(t0), false).await.unwrap(),
            WriteOutcome::Written
        );
        assert_eq!(
            persist_index(tmp.path(), &idx(t1), false).await.unwrap(),
            WriteOutcome::Unchanged
        );
        assert_eq!(
            persist_index(tmp.path(), &idx(t1), true).await.unwrap(),
            WriteOutcome::Written
        );
    }

    #[tokio::test]
    async fn unreadable_previous_file_is_overwritten() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = snapshot_path(tmp.path(), &"DGS10".into());
        std::fs::write(&path, "not json").unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(
            persist_snapshot(tmp.path(), &snap(t0, &[1.0])).await.unwrap(),
            WriteOutcome::Written
        );
    }
}
