//! Rate abstractions and core types

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_nominal() -> u32 {
    1
}

/// A quote for one currency as served by `/rates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    pub buy: f64,
    pub sell: f64,
    pub official: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default = "default_nominal")]
    pub nominal: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RateSnapshot {
    /// Difference between sell and buy as a percentage of the official rate.
    pub fn spread_pct(&self) -> f64 {
        if self.official == 0.0 {
            return 0.0;
        }
        (self.sell - self.buy) / self.official * 100.0
    }

    /// Converts a quoted value to a single unit of the currency.
    pub fn per_unit(&self, value: f64) -> f64 {
        value / f64::from(self.nominal.max(1))
    }
}

/// One fetched collection of rates. Shared, never mutated once received.
pub type RateSet = Arc<Vec<RateSnapshot>>;

pub fn find_rate<'a>(rates: &'a [RateSnapshot], code: &str) -> Option<&'a RateSnapshot> {
    rates.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Body of `/cache/status`. Every field is optional so unknown shapes still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCacheStatus {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub age_seconds: Option<f64>,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    #[serde(default)]
    pub rates_count: usize,
    #[serde(default)]
    pub last_update: Option<String>,
}

#[async_trait]
pub trait RatesSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<Vec<RateSnapshot>, FetchError>;
}

#[async_trait]
impl<T: RatesSource + ?Sized> RatesSource for Arc<T> {
    async fn fetch_rates(&self) -> Result<Vec<RateSnapshot>, FetchError> {
        (**self).fetch_rates().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_snapshot_deserialization_defaults() {
        let json = r#"{"code": "USD", "buy": 12680, "sell": 12750, "official": 12720}"#;
        let rate: RateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(rate.code, "USD");
        assert_eq!(rate.buy, 12680.0);
        assert_eq!(rate.nominal, 1);
        assert_eq!(rate.change, 0.0);
        assert!(rate.name.is_empty());
        assert!(rate.flag.is_none());
    }

    #[test]
    fn test_spread_and_per_unit() {
        let rate = RateSnapshot {
            code: "JPY".to_string(),
            name: "Yapon Ienasi".to_string(),
            flag: None,
            buy: 8400.0,
            sell: 8600.0,
            official: 8500.0,
            change: -0.1,
            nominal: 100,
            source: "cbu".to_string(),
            updated_at: None,
        };
        assert!((rate.spread_pct() - 200.0 / 8500.0 * 100.0).abs() < 1e-9);
        assert_eq!(rate.per_unit(rate.official), 85.0);

        let zero = RateSnapshot {
            official: 0.0,
            ..rate
        };
        assert_eq!(zero.spread_pct(), 0.0);
    }

    #[test]
    fn test_find_rate_is_case_insensitive() {
        let rates: Vec<RateSnapshot> = serde_json::from_str(
            r#"[{"code": "USD", "buy": 1, "sell": 2, "official": 1.5},
                {"code": "EUR", "buy": 3, "sell": 4, "official": 3.5}]"#,
        )
        .unwrap();
        assert_eq!(find_rate(&rates, "eur").map(|r| r.official), Some(3.5));
        assert!(find_rate(&rates, "GBP").is_none());
    }

    #[test]
    fn test_history_and_status_deserialization() {
        let points: Vec<HistoryPoint> =
            serde_json::from_str(r#"[{"date": "2026-10-10", "rate": 12700.5}]"#).unwrap();
        assert_eq!(
            points[0].date,
            NaiveDate::from_ymd_opt(2026, 10, 10).unwrap()
        );

        let status: ServerCacheStatus = serde_json::from_str(r#"{"something": "else"}"#).unwrap();
        assert_eq!(status, ServerCacheStatus::default());
    }
}
