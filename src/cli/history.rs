use super::ui;
use crate::core::rate::HistoryPoint;
use crate::providers::ValertService;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

/// Summary of a history series: first, last, min, max and change over the window.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub change_pct: f64,
}

pub fn summarize(points: &[HistoryPoint]) -> Option<HistorySummary> {
    let first = points.first()?.rate;
    let last = points.last()?.rate;
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.rate), hi.max(p.rate))
        });
    let change_pct = if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };
    Some(HistorySummary {
        first,
        last,
        min,
        max,
        change_pct,
    })
}

pub fn history_table(currency: &str, points: &[HistoryPoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Rate")]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.date.format("%Y-%m-%d")),
            ui::number_cell(point.rate),
        ]);
    }

    let mut output = format!(
        "{}\n\n{}",
        ui::style_text(currency, ui::StyleType::Title),
        table
    );
    if let Some(summary) = summarize(points) {
        output.push_str(&format!(
            "\n\nMin: {}  Max: {}  Change: {}",
            ui::format_amount(summary.min),
            ui::format_amount(summary.max),
            ui::style_text(
                &format!("{:+.2}%", summary.change_pct),
                if summary.change_pct >= 0.0 {
                    ui::StyleType::TotalValue
                } else {
                    ui::StyleType::Error
                }
            )
        ));
    }
    output
}

pub async fn run(service: &ValertService, currencies: &[String], days: u32) -> Result<()> {
    let pb = ui::new_progress_bar(currencies.len() as u64);
    let history_futures = currencies.iter().map(|currency| {
        let pb_clone = pb.clone();
        async move {
            let res = service.history(currency, days).await;
            pb_clone.inc(1);
            (currency.to_uppercase(), res)
        }
    });
    let results = join_all(history_futures).await;
    pb.finish_and_clear();

    let mut missing = Vec::new();
    for (currency, res) in results {
        match res {
            Some(points) => println!("{}\n", history_table(&currency, &points)),
            None => missing.push(currency),
        }
    }

    if !missing.is_empty() {
        anyhow::bail!("No history available for: {}", missing.join(", "));
    }
    Ok(())
}
