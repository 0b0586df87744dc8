use super::ui;
use crate::core::rate::RateSnapshot;
use crate::providers::{RatesOutcome, ValertService};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

/// Currencies listed first, in this order.
pub const POPULAR_CURRENCIES: [&str; 5] = ["USD", "EUR", "RUB", "GBP", "CNY"];

fn popularity(code: &str) -> usize {
    POPULAR_CURRENCIES
        .iter()
        .position(|c| c.eq_ignore_ascii_case(code))
        .unwrap_or(POPULAR_CURRENCIES.len())
}

/// Orders popular currencies first, keeping server order for the rest.
pub fn select_rates(rates: &[RateSnapshot], popular_only: bool) -> Vec<&RateSnapshot> {
    let mut selected: Vec<&RateSnapshot> = rates
        .iter()
        .filter(|r| !popular_only || popularity(&r.code) < POPULAR_CURRENCIES.len())
        .collect();
    selected.sort_by_key(|r| popularity(&r.code));
    selected
}

pub fn rates_table(rates: &[&RateSnapshot]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Name"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
        ui::header_cell("Official"),
        ui::header_cell("Change"),
        ui::header_cell("Spread"),
    ]);

    for rate in rates {
        let code = match (&rate.flag, rate.nominal) {
            (Some(flag), 1) => format!("{flag} {}", rate.code),
            (Some(flag), n) => format!("{flag} {n} {}", rate.code),
            (None, 1) => rate.code.clone(),
            (None, n) => format!("{n} {}", rate.code),
        };
        table.add_row(vec![
            Cell::new(code),
            Cell::new(&rate.name),
            ui::number_cell(rate.buy),
            ui::number_cell(rate.sell),
            ui::number_cell(rate.official),
            ui::change_cell(rate.change),
            ui::format_optional_cell(Some(rate.spread_pct()), |s| format!("{s:.2}%")),
        ]);
    }
    table.to_string()
}

/// One-line note describing where the displayed rates came from.
pub fn freshness_line(outcome: &RatesOutcome, last_updated: Option<DateTime<Utc>>) -> String {
    let updated = last_updated
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    match outcome {
        RatesOutcome::Fetched(_) => {
            ui::style_text(&format!("Live rates, updated {updated}"), ui::StyleType::Subtle)
        }
        RatesOutcome::Cached(_) => {
            ui::style_text(&format!("Cached rates, updated {updated}"), ui::StyleType::Subtle)
        }
        RatesOutcome::Stale { error, .. } => ui::style_text(
            &format!("Showing last known rates from {updated} ({error})"),
            ui::StyleType::Warning,
        ),
        RatesOutcome::Unavailable(error) => ui::style_text(
            &format!("Rates unavailable ({error})"),
            ui::StyleType::Error,
        ),
    }
}

pub async fn run(service: &ValertService, force_refresh: bool, popular_only: bool) -> Result<()> {
    let outcome = service.rates(force_refresh).await;
    let last_updated = service.rate_cache().last_updated().await;

    let Some(rates) = outcome.rates() else {
        anyhow::bail!("{}", freshness_line(&outcome, last_updated));
    };

    let selected = select_rates(rates, popular_only);
    println!("{}", rates_table(&selected));
    println!("{}", freshness_line(&outcome, last_updated));
    Ok(())
}

pub async fn run_single(service: &ValertService, currency: &str) -> Result<()> {
    let Some(rate) = service.rate(currency).await else {
        anyhow::bail!("No rate found for currency: {}", currency.to_uppercase());
    };
    println!("{}", rates_table(&[&rate]));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FetchError;
    use std::sync::Arc;

    fn rate(code: &str) -> RateSnapshot {
        RateSnapshot {
            code: code.to_string(),
            name: format!("{code} name"),
            flag: None,
            buy: 100.0,
            sell: 110.0,
            official: 105.0,
            change: -0.5,
            nominal: 1,
            source: "cbu".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn test_select_rates_orders_popular_first() {
        let rates: Vec<RateSnapshot> = ["JPY", "GBP", "USD", "KZT", "EUR"]
            .iter()
            .map(|c| rate(c))
            .collect();

        let all: Vec<&str> = select_rates(&rates, false)
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(all, vec!["USD", "EUR", "GBP", "JPY", "KZT"]);

        let popular: Vec<&str> = select_rates(&rates, true)
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(popular, vec!["USD", "EUR", "GBP"]);
    }

    #[test]
    fn test_rates_table_contains_values() {
        let usd = rate("USD");
        let output = rates_table(&[&usd]);
        assert!(output.contains("USD"));
        assert!(output.contains("110.00"));
        assert!(output.contains("-0.50%"));
    }

    #[test]
    fn test_freshness_line_mentions_fallback_error() {
        let stale = RatesOutcome::Stale {
            rates: Arc::new(vec![rate("USD")]),
            error: FetchError::Http {
                endpoint: "/rates".to_string(),
                status: 503,
            },
        };
        let line = freshness_line(&stale, None);
        assert!(line.contains("last known rates"));
        assert!(line.contains("HTTP error: 503"));

        let unavailable = RatesOutcome::Unavailable(FetchError::transport("/rates", "timed out"));
        assert!(freshness_line(&unavailable, None).contains("Rates unavailable"));
    }
}
