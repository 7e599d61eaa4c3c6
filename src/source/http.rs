use std::time::Duration;

use indexmap::IndexMap;
use reqwest::Client;
use tracing::debug;

use crate::core::{SensorSnapshot, TimeRange, TimeSeriesSet};
use crate::error::{DashError, DashResult};

use super::DataSource;
use super::wire::{decode_available_points, decode_latest, decode_range, encode_layered};

const LATEST_PATH: &str = "get_latest/";
const RANGE_PATH: &str = "get/";
const POINTS_PATH: &str = "get_available_meas_points/";

/// Measurement backend reached over HTTP.
///
/// All endpoints are `POST`. The bearer token, when given, is passed through
/// untouched.
pub struct HttpDataSource {
    http_client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpDataSource {
    /// `base_url` is the style config's `APIUrl`; a trailing `/` is added if missing.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DashResult<Self> {
        let mut base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(DashError::InvalidConfig("API url must not be empty".to_owned()));
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashError::InvalidConfig(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            base_url,
            bearer_token: None,
        })
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, body: Option<String>) -> DashResult<String> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self
            .http_client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashError::DataUnavailable(format!("request to {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashError::DataUnavailable(format!(
                "HTTP {status} from {url}"
            )));
        }
        let text = response
            .text()
            .await
            .map_err(|e| DashError::DataUnavailable(format!("failed to read {url}: {e}")))?;
        debug!(url = %url, bytes = text.len(), "backend response received");
        Ok(text)
    }
}

impl DataSource for HttpDataSource {
    async fn fetch_latest(&self) -> DashResult<IndexMap<String, SensorSnapshot>> {
        decode_latest(&self.post(LATEST_PATH, None).await?)
    }

    async fn fetch_range(&self, range: TimeRange) -> DashResult<IndexMap<String, TimeSeriesSet>> {
        let body = encode_layered(&range.to_request())?;
        decode_range(&self.post(RANGE_PATH, Some(body)).await?)
    }

    async fn fetch_available_points(&self) -> DashResult<Vec<String>> {
        decode_available_points(&self.post(POINTS_PATH, None).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpDataSource;

    #[test]
    fn base_url_gets_trailing_slash() {
        let source = HttpDataSource::new("http://127.0.0.1:8012", Duration::from_secs(5))
            .expect("source")
            .with_bearer_token("secret");
        assert_eq!(source.base_url(), "http://127.0.0.1:8012/");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(HttpDataSource::new("  ", Duration::from_secs(5)).is_err());
    }
}
