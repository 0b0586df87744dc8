//! Rate arithmetic used by the calculator, portfolio and alert commands.
use crate::core::alert::Alert;
use crate::core::config::{Bank, Holding};
use crate::core::rate::{RateSnapshot, find_rate};
use tracing::debug;

/// Which side of the trade the user is on, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// User buys foreign currency; the bank sells it.
    Buy,
    /// User sells foreign currency; the bank buys it.
    Sell,
}

/// A bank's buy and sell rate derived from the official rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankQuote {
    pub buy: f64,
    pub sell: f64,
}

impl BankQuote {
    pub fn rate_for(&self, side: Side) -> f64 {
        match side {
            Side::Buy => self.sell,
            Side::Sell => self.buy,
        }
    }
}

/// Applies a bank's percentage spreads to the official rate, rounded to whole units.
pub fn bank_quote(official: f64, bank: &Bank) -> BankQuote {
    BankQuote {
        buy: (official * (1.0 + bank.buy_spread / 100.0)).round(),
        sell: (official * (1.0 + bank.sell_spread / 100.0)).round(),
    }
}

pub fn convert(amount: f64, quote: &BankQuote, side: Side) -> f64 {
    amount * quote.rate_for(side)
}

/// Calculated value of a single holding at current official rates.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValue {
    pub currency: String,
    pub amount: f64,
    pub buy_price: f64,
    pub cost: f64,
    pub current_rate: Option<f64>,
    pub current_value: Option<f64>,
    pub profit: Option<f64>,
    pub profit_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioValuation {
    pub holdings: Vec<HoldingValue>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub total_profit_pct: f64,
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Values holdings against the per-unit official rates in `rates`.
///
/// Holdings whose currency is missing from `rates` are reported without a
/// current value and left out of the totals.
pub fn value_portfolio(holdings: &[Holding], rates: &[RateSnapshot]) -> PortfolioValuation {
    let mut total_value = 0.0;
    let mut total_cost = 0.0;

    let holdings = holdings
        .iter()
        .map(|h| {
            let cost = h.amount * h.buy_price;
            let current_rate = find_rate(rates, &h.currency).map(|r| r.per_unit(r.official));
            let current_value = current_rate.map(|rate| h.amount * rate);
            let profit = current_value.map(|v| v - cost);

            if let Some(value) = current_value {
                total_value += value;
                total_cost += cost;
            } else {
                debug!(currency = %h.currency, "No rate available for holding");
            }

            HoldingValue {
                currency: h.currency.to_uppercase(),
                amount: h.amount,
                buy_price: h.buy_price,
                cost,
                current_rate,
                current_value,
                profit,
                profit_pct: profit.map(|p| percent_of(p, cost)),
            }
        })
        .collect();

    let total_profit = total_value - total_cost;
    PortfolioValuation {
        holdings,
        total_value,
        total_cost,
        total_profit,
        total_profit_pct: percent_of(total_profit, total_cost),
    }
}

/// Active alerts whose currency's official rate has crossed the threshold.
pub fn triggered_alerts<'a>(alerts: &'a [Alert], rates: &[RateSnapshot]) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|alert| alert.active)
        .filter(|alert| {
            find_rate(rates, &alert.currency)
                .is_some_and(|rate| alert.direction.is_triggered(alert.threshold, rate.official))
        })
        .collect()
}
