//! Reads the published index and snapshots for a render pass.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::store::INDEX_FILE;
use crate::types::{IndexDocument, SeriesId, SeriesSnapshot};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load {path}: {status}")]
    Status { path: String, status: u16 },
    #[error("Failed to load {path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to load {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid data url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Fetches one published JSON file by name (`_index.json`, `DGS10.json`, ...).
#[async_trait]
pub trait SnapshotLoader: Send + Sync {
    async fn load_text(&self, name: &str) -> Result<String, LoadError>;
}

async fn load_json<T: DeserializeOwned>(
    loader: &dyn SnapshotLoader,
    name: &str,
) -> Result<T, LoadError> {
    let text = loader.load_text(name).await?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: name.to_string(),
        source,
    })
}

pub async fn load_index(loader: &dyn SnapshotLoader) -> Result<IndexDocument, LoadError> {
    load_json(loader, INDEX_FILE).await
}

pub async fn load_snapshot(
    loader: &dyn SnapshotLoader,
    id: &SeriesId,
) -> Result<SeriesSnapshot, LoadError> {
    load_json(loader, &format!("{id}.json")).await
}

/// Index plus every snapshot it lists, loaded one after another.
pub async fn load_all(
    loader: &dyn SnapshotLoader,
) -> Result<(IndexDocument, HashMap<SeriesId, SeriesSnapshot>), LoadError> {
    let index = load_index(loader).await?;
    let mut store = HashMap::with_capacity(index.series.len());
    for id in &index.series {
        let snap = load_snapshot(loader, id).await?;
        tracing::debug!(series_id = %id, points = snap.points, "snapshot loaded");
        store.insert(id.clone(), snap);
    }
    Ok((index, store))
}

/// Reads from a static host; every request carries `?t=<unix millis>` so
/// intermediate caches never answer with a stale copy.
pub struct HttpLoader {
    http: reqwest::Client,
    base: Url,
}

impl HttpLoader {
    pub fn new(base: &str) -> Result<Self, LoadError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn url_for(&self, name: &str) -> Result<Url, LoadError> {
        let mut url = self.base.join(name)?;
        url.query_pairs_mut()
            .append_pair("t", &Utc::now().timestamp_millis().to_string());
        Ok(url)
    }
}

#[async_trait]
impl SnapshotLoader for HttpLoader {
    async fn load_text(&self, name: &str) -> Result<String, LoadError> {
        let url = self.url_for(name)?;
        let http_err = |source| LoadError::Http {
            path: name.to_string(),
            source,
        };
        let resp = self.http.get(url).send().await.map_err(http_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: name.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(http_err)
    }
}

/// Reads straight from the fetcher's output directory.
pub struct FsLoader {
    dir: PathBuf,
}

impl FsLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SnapshotLoader for FsLoader {
    async fn load_text(&self, name: &str) -> Result<String, LoadError> {
        let path = self.dir.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_are_cache_busted_and_relative_to_base() {
        let loader = HttpLoader::new("https://example.org/dash/data").unwrap();
        let url = loader.url_for("_index.json").unwrap();
        assert_eq!(url.path(), "/dash/data/_index.json");
        let t = url.query_pairs().find(|(k, _)| k == "t").map(|(_, v)| v.into_owned());
        assert!(t.is_some_and(|v| v.parse::<i64>().is_ok()));
    }

    #[tokio::test]
    async fn missing_index_is_an_error() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let loader = FsLoader::new(tmp.path());
        let err = load_all(&loader).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("_index.json"));
    }
}
