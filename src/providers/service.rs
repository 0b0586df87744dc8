//! Degrade-to-benign facade over the API client and the rate cache.
//!
//! Every method here logs failures and returns a "no data" value instead of an
//! error. Callers that need the failure kind build their own [`ApiClient`], or
//! inspect the [`RatesOutcome`] from [`ValertService::rates`].
use crate::core::alert::{Alert, NewAlert};
use crate::core::clock::Clock;
use crate::core::config::AppConfig;
use crate::core::rate::{HistoryPoint, RateSnapshot, ServerCacheStatus};
use crate::providers::api::ApiClient;
use crate::providers::caching::{RateCacheClient, RatesOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ValertService {
    api: Arc<ApiClient>,
    rates: RateCacheClient<Arc<ApiClient>>,
}

impl ValertService {
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let api = Arc::new(api);
        Self {
            rates: RateCacheClient::new(Arc::clone(&api), ttl),
            api,
        }
    }

    pub fn with_clock(api: ApiClient, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let api = Arc::new(api);
        Self {
            rates: RateCacheClient::with_clock(Arc::clone(&api), ttl, clock),
            api,
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(ApiClient::new(&config.api)?, config.cache.ttl()))
    }

    pub fn rate_cache(&self) -> &RateCacheClient<Arc<ApiClient>> {
        &self.rates
    }

    pub async fn rates(&self, force_refresh: bool) -> RatesOutcome {
        self.rates.get_rates(force_refresh).await
    }

    pub async fn rate(&self, currency: &str) -> Option<RateSnapshot> {
        self.api
            .fetch_rate(currency)
            .await
            .inspect_err(|e| warn!(%currency, error = %e, "Failed to fetch rate"))
            .ok()
    }

    pub async fn history(&self, currency: &str, days: u32) -> Option<Vec<HistoryPoint>> {
        self.api
            .fetch_history(currency, days)
            .await
            .inspect_err(|e| warn!(%currency, days, error = %e, "Failed to fetch history"))
            .ok()
    }

    pub async fn server_cache_status(&self) -> Option<ServerCacheStatus> {
        self.api
            .cache_status()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to get cache status"))
            .ok()
    }

    /// Forces the server to recompute rates. On success the local snapshot is
    /// dropped too, so it cannot be served even as a fallback.
    pub async fn refresh_server_cache(&self) -> bool {
        match self.api.refresh_cache().await {
            Ok(()) => {
                self.rates.invalidate().await;
                info!("Server cache refreshed, local rates invalidated");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh cache");
                false
            }
        }
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.api
            .fetch_alerts()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch alerts"))
            .unwrap_or_default()
    }

    pub async fn create_alert(&self, alert: NewAlert) -> Option<Alert> {
        self.api
            .create_alert(&alert)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to create alert"))
            .ok()
    }

    pub async fn delete_alert(&self, id: u64) -> bool {
        self.api
            .delete_alert(id)
            .await
            .inspect_err(|e| warn!(id, error = %e, "Failed to delete alert"))
            .is_ok()
    }
}
