use crate::core::clock::{Clock, SystemClock};
use crate::core::rate::{RateSet, RateSnapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Client-side TTL for the rates snapshot.
pub const DEFAULT_RATES_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing fetched yet, or cleared.
    Empty,
    /// Populated and within TTL.
    Fresh,
    /// Populated but past TTL. Still served as a fallback.
    Stale,
}

// Data and its timestamp only ever exist together.
struct Populated {
    rates: RateSet,
    stored_at: Instant,
    fetched_at: DateTime<Utc>,
}

/// Single-entry memo of the latest rates snapshot.
///
/// Every operation takes the lock only long enough to read or swap the entry,
/// so concurrent writers resolve as last-writer-wins.
#[derive(Clone)]
pub struct RateCache {
    entry: Arc<Mutex<Option<Populated>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: Arc::new(Mutex::new(None)),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_within_ttl(&self, populated: &Populated) -> bool {
        self.clock.now().saturating_duration_since(populated.stored_at) < self.ttl
    }

    /// Returns the snapshot only if it is still within TTL.
    pub async fn get_fresh(&self) -> Option<RateSet> {
        let entry = self.entry.lock().await;
        match entry.as_ref() {
            Some(populated) if self.is_within_ttl(populated) => {
                debug!("Cache HIT for rates");
                Some(Arc::clone(&populated.rates))
            }
            Some(_) => {
                debug!("Cache entry expired for rates");
                None
            }
            None => {
                debug!("Cache MISS for rates");
                None
            }
        }
    }

    /// Returns the snapshot regardless of age.
    pub async fn last_known(&self) -> Option<RateSet> {
        let entry = self.entry.lock().await;
        entry.as_ref().map(|populated| Arc::clone(&populated.rates))
    }

    /// Replaces the whole entry with `rates` stamped at the current time.
    pub async fn put(&self, rates: Vec<RateSnapshot>) -> RateSet {
        let rates: RateSet = Arc::new(rates);
        let populated = Populated {
            rates: Arc::clone(&rates),
            stored_at: self.clock.now(),
            fetched_at: self.clock.wall(),
        };

        let mut entry = self.entry.lock().await;
        debug!(count = rates.len(), "Cache PUT for rates");
        *entry = Some(populated);
        rates
    }

    pub async fn clear(&self) {
        let mut entry = self.entry.lock().await;
        *entry = None;
        debug!("Cache CLEAR for rates");
    }

    pub async fn state(&self) -> CacheState {
        let entry = self.entry.lock().await;
        match entry.as_ref() {
            None => CacheState::Empty,
            Some(populated) if self.is_within_ttl(populated) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    pub async fn is_fresh(&self) -> bool {
        self.state().await == CacheState::Fresh
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let entry = self.entry.lock().await;
        entry.as_ref().map(|populated| populated.fetched_at)
    }

    pub async fn age(&self) -> Option<Duration> {
        let entry = self.entry.lock().await;
        entry
            .as_ref()
            .map(|populated| self.clock.now().saturating_duration_since(populated.stored_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    fn usd(buy: f64) -> Vec<RateSnapshot> {
        vec![RateSnapshot {
            code: "USD".to_string(),
            name: "AQSh Dollari".to_string(),
            flag: None,
            buy,
            sell: buy + 70.0,
            official: buy + 40.0,
            change: 0.15,
            nominal: 1,
            source: "cbu".to_string(),
            updated_at: None,
        }]
    }

    #[tokio::test]
    async fn test_cache_state_transitions() {
        let clock = Arc::new(ManualClock::new());
        let cache = RateCache::with_clock(Duration::from_millis(60_000), clock.clone());

        // Initially, cache is empty
        assert_eq!(cache.state().await, CacheState::Empty);
        assert!(cache.get_fresh().await.is_none());
        assert!(cache.last_known().await.is_none());
        assert!(cache.age().await.is_none());

        let stored = cache.put(usd(12680.0)).await;
        assert_eq!(cache.state().await, CacheState::Fresh);
        assert!(Arc::ptr_eq(&cache.get_fresh().await.unwrap(), &stored));

        // Exactly at TTL the entry is no longer fresh
        clock.advance(Duration::from_millis(60_000));
        assert_eq!(cache.state().await, CacheState::Stale);
        assert!(cache.get_fresh().await.is_none());
        assert!(Arc::ptr_eq(&cache.last_known().await.unwrap(), &stored));
        assert_eq!(cache.age().await, Some(Duration::from_millis(60_000)));

        // A new put makes it fresh again
        cache.put(usd(12700.0)).await;
        assert!(cache.is_fresh().await);

        cache.clear().await;
        assert_eq!(cache.state().await, CacheState::Empty);
        assert!(cache.last_known().await.is_none());
        assert!(cache.fetched_at().await.is_none());
    }

    #[tokio::test]
    async fn test_fetched_at_follows_clock() {
        let clock = Arc::new(ManualClock::new());
        let cache = RateCache::with_clock(Duration::from_secs(60), clock.clone());

        clock.advance(Duration::from_secs(5));
        let expected = clock.wall();
        cache.put(usd(12680.0)).await;
        assert_eq!(cache.fetched_at().await, Some(expected));
    }
}
