use super::ui;
use crate::core::analytics::{self, PortfolioValuation};
use crate::core::config::Holding;
use crate::providers::ValertService;
use anyhow::{Result, anyhow};
use comfy_table::Cell;

impl PortfolioValuation {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Amount"),
            ui::header_cell("Buy Price"),
            ui::header_cell("Rate"),
            ui::header_cell("Value"),
            ui::header_cell("Profit"),
            ui::header_cell("Profit (%)"),
        ]);

        for holding in &self.holdings {
            table.add_row(vec![
                Cell::new(&holding.currency),
                ui::number_cell(holding.amount),
                ui::number_cell(holding.buy_price),
                ui::format_optional_cell(holding.current_rate, ui::format_amount),
                ui::format_optional_cell(holding.current_value, ui::format_amount),
                ui::format_optional_cell(holding.profit, ui::format_amount),
                holding.profit_pct.map_or_else(ui::na_cell, ui::change_cell),
            ]);
        }

        let profit_style = if self.total_profit >= 0.0 {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };

        let mut output = format!("{}\n\n", ui::style_text("Portfolio", ui::StyleType::Title));
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {}\n{} {} ({:+.2}%)",
            ui::style_text("Total Value:", ui::StyleType::TotalLabel),
            ui::format_amount(self.total_value),
            ui::style_text("Total Profit:", ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_amount(self.total_profit), profit_style),
            self.total_profit_pct
        ));
        output
    }
}

pub async fn run(service: &ValertService, holdings: &[Holding]) -> Result<()> {
    if holdings.is_empty() {
        println!("No holdings configured. Add a `portfolio` section to the config file.");
        return Ok(());
    }

    let rates = service
        .rates(false)
        .await
        .into_rates()
        .ok_or_else(|| anyhow!("Rates are unavailable, cannot value portfolio"))?;

    let valuation = analytics::value_portfolio(holdings, &rates);
    println!("{}", valuation.display_as_table());
    Ok(())
}
