use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::core::alert::{Alert, NewAlert};
use crate::core::config::ApiConfig;
use crate::core::error::FetchError;
use crate::core::rate::{HistoryPoint, RateSnapshot, RatesSource, ServerCacheStatus};

/// Header carrying the host platform's session payload.
pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";

pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Thin client over the VAlert REST API.
///
/// Every call maps failures onto [`FetchError`]: send errors and timeouts are
/// `Transport`, non-2xx responses are `Http`, undecodable bodies are `Parse`.
/// Caller-supplied values such as currency codes are percent-encoded as a
/// single path segment.
pub struct ApiClient {
    base_url: Url,
    init_data: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot have paths: {}", config.base_url);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("valert/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(ApiClient {
            base_url,
            init_data: config.init_data.clone().filter(|data| !data.is_empty()),
            client,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`, base URLs always accept path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("Requesting {} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.init_data {
            Some(init_data) => builder.header(INIT_DATA_HEADER, init_data),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, endpoint: &str) -> Result<Response, FetchError> {
        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::transport(endpoint, e))?;

        debug!(status = %response.status(), "Received API response");

        if !response.status().is_success() {
            return Err(FetchError::Http {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, FetchError> {
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::transport(endpoint, e))?;

        serde_json::from_str(&text).map_err(|e| FetchError::parse(endpoint, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let endpoint = url.path().to_string();
        let response = self.send(self.request(Method::GET, url), &endpoint).await?;
        Self::decode(response, &endpoint).await
    }

    #[instrument(name = "FetchRates", skip(self))]
    pub async fn fetch_rates(&self) -> Result<Vec<RateSnapshot>, FetchError> {
        self.get_json(self.url(&["rates"])).await
    }

    #[instrument(name = "FetchRate", skip(self))]
    pub async fn fetch_rate(&self, currency: &str) -> Result<RateSnapshot, FetchError> {
        let code = currency.to_uppercase();
        self.get_json(self.url(&["rates", code.as_str()])).await
    }

    #[instrument(name = "FetchHistory", skip(self))]
    pub async fn fetch_history(
        &self,
        currency: &str,
        days: u32,
    ) -> Result<Vec<HistoryPoint>, FetchError> {
        let code = currency.to_uppercase();
        let mut url = self.url(&["history", code.as_str()]);
        url.query_pairs_mut().append_pair("days", &days.to_string());
        self.get_json(url).await
    }

    pub async fn cache_status(&self) -> Result<ServerCacheStatus, FetchError> {
        self.get_json(self.url(&["cache", "status"])).await
    }

    /// Asks the server to recompute its rates. Any response body is ignored.
    pub async fn refresh_cache(&self) -> Result<(), FetchError> {
        let url = self.url(&["cache", "refresh"]);
        let endpoint = url.path().to_string();
        self.send(self.request(Method::POST, url), &endpoint)
            .await
            .map(|_| ())
    }

    /// Lists alerts. An entry that does not decode is skipped, not fatal to the list.
    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>, FetchError> {
        let raw: Vec<serde_json::Value> = self.get_json(self.url(&["alerts"])).await?;
        Ok(raw
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value(entry)
                    .inspect_err(|e| warn!(error = %e, "Skipping undecodable alert"))
                    .ok()
            })
            .collect())
    }

    pub async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, FetchError> {
        let url = self.url(&["alerts"]);
        let endpoint = url.path().to_string();
        let response = self
            .send(self.request(Method::POST, url).json(alert), &endpoint)
            .await?;
        Self::decode(response, &endpoint).await
    }

    pub async fn delete_alert(&self, id: u64) -> Result<(), FetchError> {
        let id = id.to_string();
        let url = self.url(&["alerts", id.as_str()]);
        let endpoint = url.path().to_string();
        self.send(self.request(Method::DELETE, url), &endpoint)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl RatesSource for ApiClient {
    async fn fetch_rates(&self) -> Result<Vec<RateSnapshot>, FetchError> {
        ApiClient::fetch_rates(self).await
    }
}
