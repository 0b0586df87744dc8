use super::ui;
use crate::core::analytics::{self, BankQuote, Side};
use crate::core::config::Bank;
use crate::core::rate::{RateSnapshot, find_rate};
use crate::providers::ValertService;
use anyhow::{Result, anyhow};
use comfy_table::{Attribute, Cell};

struct BankConversion<'a> {
    bank: &'a Bank,
    quote: BankQuote,
    result: f64,
}

fn conversions<'a>(
    amount: f64,
    rate: &RateSnapshot,
    banks: &'a [Bank],
    side: Side,
) -> Vec<BankConversion<'a>> {
    let official = rate.per_unit(rate.official);
    banks
        .iter()
        .map(|bank| {
            let quote = analytics::bank_quote(official, bank);
            BankConversion {
                bank,
                quote,
                result: analytics::convert(amount, &quote, side),
            }
        })
        .collect()
}

/// Index of the best deal: cheapest when buying, highest payout when selling.
fn best_index(conversions: &[BankConversion<'_>], side: Side) -> Option<usize> {
    conversions
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let ord = a.result.total_cmp(&b.result);
            match side {
                Side::Buy => ord,
                Side::Sell => ord.reverse(),
            }
        })
        .map(|(i, _)| i)
}

pub fn conversion_table(amount: f64, rate: &RateSnapshot, banks: &[Bank], side: Side) -> String {
    let conversions = conversions(amount, rate, banks, side);
    let best = best_index(&conversions, side);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Bank"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
        ui::header_cell(&format!("{} {} =", ui::format_amount(amount), rate.code)),
    ]);

    for (i, conversion) in conversions.iter().enumerate() {
        let mut result = ui::number_cell(conversion.result);
        if Some(i) == best {
            result = result.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(&conversion.bank.name),
            ui::number_cell(conversion.quote.buy),
            ui::number_cell(conversion.quote.sell),
            result,
        ]);
    }

    let action = match side {
        Side::Buy => "Buying",
        Side::Sell => "Selling",
    };
    format!(
        "{} {} {}\n\n{}",
        action,
        ui::format_amount(amount),
        ui::style_text(&rate.code, ui::StyleType::Title),
        table
    )
}

pub fn conversion_line(amount: f64, rate: &RateSnapshot, bank: &Bank, side: Side) -> String {
    let quote = analytics::bank_quote(rate.per_unit(rate.official), bank);
    let applied = quote.rate_for(side);
    format!(
        "{} {} × {} = {} ({})",
        ui::format_amount(amount),
        rate.code,
        ui::format_amount(applied),
        ui::style_text(
            &ui::format_amount(analytics::convert(amount, &quote, side)),
            ui::StyleType::TotalValue
        ),
        bank.name
    )
}

pub async fn run(
    service: &ValertService,
    banks: &[Bank],
    amount: f64,
    currency: &str,
    bank_code: Option<&str>,
    side: Side,
) -> Result<()> {
    ui::ensure_positive("Amount", amount)?;

    let rates = service
        .rates(false)
        .await
        .into_rates()
        .ok_or_else(|| anyhow!("Rates are unavailable, cannot convert"))?;
    let rate = find_rate(&rates, currency)
        .ok_or_else(|| anyhow!("No rate found for currency: {}", currency.to_uppercase()))?;

    match bank_code {
        Some(code) => {
            let bank = banks
                .iter()
                .find(|b| b.code.eq_ignore_ascii_case(code))
                .ok_or_else(|| {
                    let known: Vec<&str> = banks.iter().map(|b| b.code.as_str()).collect();
                    anyhow!("Unknown bank: {} (known: {})", code, known.join(", "))
                })?;
            println!("{}", conversion_line(amount, rate, bank, side));
        }
        None => println!("{}", conversion_table(amount, rate, banks, side)),
    }
    Ok(())
}
