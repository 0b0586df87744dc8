use crate::core::cache::{CacheState, RateCache};
use crate::core::clock::Clock;
use crate::core::error::FetchError;
use crate::core::rate::{RateSet, RatesSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of [`RateCacheClient::get_rates`].
#[derive(Debug, Clone)]
pub enum RatesOutcome {
    /// Fetched from the network just now.
    Fetched(RateSet),
    /// Served from a fresh cache entry without network access.
    Cached(RateSet),
    /// The fetch failed; this is the last known-good snapshot, past or within TTL.
    Stale { rates: RateSet, error: FetchError },
    /// The fetch failed and nothing was ever cached.
    Unavailable(FetchError),
}

impl RatesOutcome {
    pub fn rates(&self) -> Option<&RateSet> {
        match self {
            RatesOutcome::Fetched(rates)
            | RatesOutcome::Cached(rates)
            | RatesOutcome::Stale { rates, .. } => Some(rates),
            RatesOutcome::Unavailable(_) => None,
        }
    }

    pub fn into_rates(self) -> Option<RateSet> {
        match self {
            RatesOutcome::Fetched(rates)
            | RatesOutcome::Cached(rates)
            | RatesOutcome::Stale { rates, .. } => Some(rates),
            RatesOutcome::Unavailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            RatesOutcome::Stale { error, .. } | RatesOutcome::Unavailable(error) => Some(error),
            _ => None,
        }
    }

    /// True when the data came from a fallback or is missing.
    pub fn is_degraded(&self) -> bool {
        self.error().is_some()
    }
}

/// Serves the latest rates snapshot from `source`, memoized for `ttl`.
///
/// Failed fetches never reach the caller as errors: the last known-good
/// snapshot is returned instead, or [`RatesOutcome::Unavailable`] on a cold
/// cache. Concurrent callers are not coalesced; each stale or forced call goes
/// to the network and the last fetch to complete owns the cache.
pub struct RateCacheClient<S: RatesSource> {
    source: S,
    cache: RateCache,
}

impl<S: RatesSource> RateCacheClient<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: RateCache::new(ttl),
        }
    }

    pub fn with_clock(source: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: RateCache::with_clock(ttl, clock),
        }
    }

    pub async fn get_rates(&self, force_refresh: bool) -> RatesOutcome {
        if !force_refresh {
            if let Some(rates) = self.cache.get_fresh().await {
                return RatesOutcome::Cached(rates);
            }
        }

        debug!(force_refresh, "Fetching rates from source");
        match self.source.fetch_rates().await {
            Ok(rates) => RatesOutcome::Fetched(self.cache.put(rates).await),
            Err(error) => match self.cache.last_known().await {
                Some(rates) => {
                    warn!(%error, "Failed to fetch rates, serving last known snapshot");
                    RatesOutcome::Stale { rates, error }
                }
                None => {
                    warn!(%error, "Failed to fetch rates, no snapshot cached");
                    RatesOutcome::Unavailable(error)
                }
            },
        }
    }

    /// Drops the cached snapshot so it is not served even as a fallback.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    pub async fn is_fresh(&self) -> bool {
        self.cache.is_fresh().await
    }

    pub async fn state(&self) -> CacheState {
        self.cache.state().await
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.cache.fetched_at().await
    }

    pub async fn age(&self) -> Option<Duration> {
        self.cache.age().await
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::error::FetchErrorKind;
    use crate::core::rate::RateSnapshot;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_millis(60_000);

    fn usd(buy: f64) -> Vec<RateSnapshot> {
        vec![RateSnapshot {
            code: "USD".to_string(),
            name: "AQSh Dollari".to_string(),
            flag: None,
            buy,
            sell: 12750.0,
            official: 12720.0,
            change: 0.15,
            nominal: 1,
            source: "cbu".to_string(),
            updated_at: None,
        }]
    }

    fn offline() -> FetchError {
        FetchError::transport("/rates", "connection refused")
    }

    /// Replays scripted responses in order, optionally after a delay.
    struct ScriptedSource {
        call_count: AtomicUsize,
        script: Mutex<VecDeque<(Duration, Result<Vec<RateSnapshot>, FetchError>)>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                script: Mutex::new(VecDeque::new()),
            }
        }

        fn then(self, result: Result<Vec<RateSnapshot>, FetchError>) -> Self {
            self.then_after(Duration::ZERO, result)
        }

        fn then_after(self, delay: Duration, result: Result<Vec<RateSnapshot>, FetchError>) -> Self {
            self.script.lock().unwrap().push_back((delay, result));
            self
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RatesSource for ScriptedSource {
        async fn fetch_rates(&self) -> Result<Vec<RateSnapshot>, FetchError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            let (delay, result) = next.expect("unexpected fetch");
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }

    fn client(source: ScriptedSource) -> (RateCacheClient<ScriptedSource>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let client = RateCacheClient::with_clock(source, TTL, clock.clone());
        (client, clock)
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let (client, clock) = client(ScriptedSource::new().then(Ok(usd(12680.0))));

        let first = client.get_rates(false).await;
        assert!(matches!(first, RatesOutcome::Fetched(_)));
        assert_eq!(client.source().calls(), 1);
        assert_eq!(client.state().await, CacheState::Fresh);

        clock.set_elapsed(Duration::from_millis(30_000));
        let second = client.get_rates(false).await;
        assert!(matches!(second, RatesOutcome::Cached(_)));
        assert_eq!(client.source().calls(), 1);
        assert!(Arc::ptr_eq(
            first.rates().unwrap(),
            second.rates().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_force_refresh_always_hits_network() {
        let (client, _clock) = client(
            ScriptedSource::new()
                .then(Ok(usd(12680.0)))
                .then(Ok(usd(12690.0))),
        );

        client.get_rates(false).await;
        assert!(client.is_fresh().await);

        let forced = client.get_rates(true).await;
        assert_eq!(client.source().calls(), 2);
        assert_eq!(forced.rates().unwrap()[0].buy, 12690.0);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_cached_snapshot() {
        let (client, _clock) = client(
            ScriptedSource::new()
                .then(Ok(usd(12680.0)))
                .then(Err(offline())),
        );

        let first = client.get_rates(false).await.into_rates().unwrap();
        let fallback = client.get_rates(true).await;

        match &fallback {
            RatesOutcome::Stale { rates, error } => {
                assert!(Arc::ptr_eq(rates, &first));
                assert_eq!(error.kind(), FetchErrorKind::Transport);
            }
            other => panic!("Expected stale fallback, got {other:?}"),
        }
        assert!(fallback.is_degraded());
        // Failure leaves the entry untouched
        assert_eq!(client.state().await, CacheState::Fresh);
    }

    #[tokio::test]
    async fn test_cold_start_failure_is_unavailable() {
        let (client, _clock) = client(ScriptedSource::new().then(Err(FetchError::Http {
            endpoint: "/rates".to_string(),
            status: 502,
        })));

        let outcome = client.get_rates(false).await;
        assert!(outcome.rates().is_none());
        assert!(matches!(
            outcome.error(),
            Some(FetchError::Http { status: 502, .. })
        ));
        assert_eq!(client.state().await, CacheState::Empty);
    }

    #[tokio::test]
    async fn test_invalidate_drops_fallback() {
        let (client, _clock) = client(
            ScriptedSource::new()
                .then(Ok(usd(12680.0)))
                .then(Err(offline())),
        );

        client.get_rates(false).await;
        client.invalidate().await;
        assert!(!client.is_fresh().await);
        assert!(client.last_updated().await.is_none());

        let outcome = client.get_rates(false).await;
        assert!(matches!(outcome, RatesOutcome::Unavailable(_)));
        assert_eq!(client.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches_and_falls_back() {
        // t=0 success, t=70000 failure, t=70001 success
        let (client, clock) = client(
            ScriptedSource::new()
                .then(Ok(usd(12680.0)))
                .then(Err(offline()))
                .then(Ok(usd(12700.0))),
        );

        let initial = client.get_rates(false).await.into_rates().unwrap();
        assert_eq!(client.age().await, Some(Duration::ZERO));

        clock.set_elapsed(Duration::from_millis(70_000));
        assert_eq!(client.state().await, CacheState::Stale);

        let failed = client.get_rates(false).await;
        assert_eq!(client.source().calls(), 2);
        assert!(Arc::ptr_eq(failed.rates().unwrap(), &initial));
        assert_eq!(client.state().await, CacheState::Stale);

        clock.advance(Duration::from_millis(1));
        let refreshed = client.get_rates(false).await;
        assert!(matches!(refreshed, RatesOutcome::Fetched(_)));
        assert_eq!(refreshed.rates().unwrap()[0].buy, 12700.0);
        assert_eq!(client.state().await, CacheState::Fresh);
        assert_eq!(client.age().await, Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_concurrent_forced_fetches_last_to_resolve_wins() {
        // The first request issued resolves last
        let (client, _clock) = client(
            ScriptedSource::new()
                .then_after(Duration::from_millis(50), Ok(usd(11111.0)))
                .then(Ok(usd(22222.0))),
        );

        let (slow, fast) = tokio::join!(client.get_rates(true), client.get_rates(true));
        assert_eq!(client.source().calls(), 2);
        assert_eq!(slow.rates().unwrap()[0].buy, 11111.0);
        assert_eq!(fast.rates().unwrap()[0].buy, 22222.0);

        let cached = client.get_rates(false).await;
        assert!(matches!(cached, RatesOutcome::Cached(_)));
        assert!(Arc::ptr_eq(cached.rates().unwrap(), slow.rates().unwrap()));
    }
}
