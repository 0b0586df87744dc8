use super::ui;
use crate::core::alert::{Alert, Direction, NewAlert};
use crate::core::analytics;
use crate::providers::ValertService;
use anyhow::{Result, anyhow};
use comfy_table::Cell;

pub fn alerts_table(alerts: &[&Alert]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Currency"),
        ui::header_cell("Direction"),
        ui::header_cell("Threshold"),
        ui::header_cell("Active"),
        ui::header_cell("Created"),
    ]);

    for alert in alerts {
        table.add_row(vec![
            Cell::new(alert.id),
            Cell::new(&alert.currency),
            Cell::new(alert.direction),
            ui::number_cell(alert.threshold),
            Cell::new(if alert.active { "yes" } else { "no" }),
            Cell::new(alert.created_at.as_deref().unwrap_or("-")),
        ]);
    }
    table.to_string()
}

pub async fn list(service: &ValertService) -> Result<()> {
    let alerts = service.alerts().await;
    if alerts.is_empty() {
        println!("No alerts.");
        return Ok(());
    }
    let refs: Vec<&Alert> = alerts.iter().collect();
    println!("{}", alerts_table(&refs));
    Ok(())
}

pub async fn add(
    service: &ValertService,
    currency: &str,
    direction: Direction,
    threshold: f64,
) -> Result<()> {
    ui::ensure_positive("Threshold", threshold)?;

    let alert = service
        .create_alert(NewAlert::new(currency, direction, threshold))
        .await
        .ok_or_else(|| anyhow!("Failed to create alert for {}", currency.to_uppercase()))?;

    println!(
        "Created alert #{}: {} {} {}",
        alert.id,
        alert.currency,
        alert.direction,
        ui::format_amount(alert.threshold)
    );
    Ok(())
}

pub async fn remove(service: &ValertService, id: u64) -> Result<()> {
    if !service.delete_alert(id).await {
        anyhow::bail!("Failed to delete alert #{}", id);
    }
    println!("Deleted alert #{id}");
    Ok(())
}

/// Lists active alerts whose threshold the current official rate has crossed.
pub async fn check(service: &ValertService) -> Result<()> {
    let (alerts, outcome) = tokio::join!(service.alerts(), service.rates(false));
    let rates = outcome
        .into_rates()
        .ok_or_else(|| anyhow!("Rates are unavailable, cannot check alerts"))?;

    let triggered = analytics::triggered_alerts(&alerts, &rates);
    if triggered.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("None of {} alerts triggered.", alerts.len()),
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Triggered alerts", ui::StyleType::Title),
        alerts_table(&triggered)
    );
    Ok(())
}
