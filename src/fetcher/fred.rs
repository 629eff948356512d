use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{FetchError, Observation, ObservationSource};
use crate::types::{Frequency, SeriesId};

pub const DEFAULT_API_BASE: &str = "https://api.stlouisfed.org/fred/series/observations";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

/// `series/observations` client. One attempt per call, no retries.
pub struct FredClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl FredClient {
    /// Fails before any request is made when the key is absent or blank.
    pub fn new(api_base: &str, api_key: Option<String>) -> Result<Self, FetchError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(FetchError::MissingCredential)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(api_base)?,
            api_key,
        })
    }

    pub fn request_url(&self, series_id: &SeriesId, freq: &Frequency, limit: usize) -> Url {
        let mut url = self.base.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("series_id", series_id.as_str())
                .append_pair("api_key", &self.api_key)
                .append_pair("file_type", "json");
            if let Some(f) = freq.query_param() {
                q.append_pair("frequency", f);
            }
            q.append_pair("sort_order", "desc")
                .append_pair("limit", &limit.to_string());
        }
        url
    }
}

#[async_trait]
impl ObservationSource for FredClient {
    async fn observations(
        &self,
        series_id: &SeriesId,
        freq: &Frequency,
        limit: usize,
    ) -> Result<Vec<Observation>, FetchError> {
        let url = self.request_url(series_id, freq, limit);
        tracing::debug!(%series_id, ?freq, limit, "requesting observations");

        // The request url carries the api key; keep it out of the error.
        let http_err = |source: reqwest::Error| FetchError::Http {
            series_id: series_id.clone(),
            source: source.without_url(),
        };
        let resp = self.http.get(url).send().await.map_err(http_err)?;
        let status = resp.status();
        let body = resp.text().await.map_err(http_err)?;

        if !status.is_success() {
            return Err(FetchError::Upstream {
                series_id: series_id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ObservationsResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                series_id: series_id.clone(),
                source,
            })?;
        Ok(parsed.observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FredClient {
        FredClient::new(DEFAULT_API_BASE, Some("k3y".into())).unwrap()
    }

    #[test]
    fn missing_or_blank_key_is_fatal() {
        assert!(matches!(
            FredClient::new(DEFAULT_API_BASE, None),
            Err(FetchError::MissingCredential)
        ));
        assert!(matches!(
            FredClient::new(DEFAULT_API_BASE, Some("  ".into())),
            Err(FetchError::MissingCredential)
        ));
    }

    #[test]
    fn weekly_request_carries_frequency() {
        let url = client().request_url(&"DGS10".into(), &Frequency::weekly(), 166);
        let q: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| q.iter().find(|(n, _)| n == k).map(|(_, v)| v.as_str());
        assert_eq!(get("series_id"), Some("DGS10"));
        assert_eq!(get("api_key"), Some("k3y"));
        assert_eq!(get("file_type"), Some("json"));
        assert_eq!(get("frequency"), Some("w"));
        assert_eq!(get("sort_order"), Some("desc"));
        assert_eq!(get("limit"), Some("166"));
    }

    #[test]
    fn native_request_omits_frequency() {
        let url = client().request_url(&"GFDEBTN".into(), &Frequency::Native, 166);
        assert!(!url.query_pairs().any(|(k, _)| k == "frequency"));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_api_key() {
        // Nothing listens on port 1, so the request fails before any response.
        let client = FredClient::new(
            "http://127.0.0.1:1/fred/series/observations",
            Some("SUPERSECRETKEY".into()),
        )
        .unwrap();
        let err = client
            .observations(&"DGS10".into(), &Frequency::weekly(), 166)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http { .. }));

        let shown = format!("{:#}", anyhow::Error::from(err));
        assert!(shown.contains("DGS10"), "{shown}");
        assert!(!shown.contains("SUPERSECRETKEY"), "{shown}");
    }

    #[test]
    fn parses_observation_payload() {
        let raw = r#"{"count":2,"observations":[
            {"realtime_start":"2024-01-10","date":"2024-01-05","value":"4.05"},
            {"realtime_start":"2024-01-10","date":"2023-12-29","value":"."}
        ]}"#;
        let parsed: ObservationsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.observations[1].value, ".");
    }
}
