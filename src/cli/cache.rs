use super::ui;
use crate::core::rate::ServerCacheStatus;
use crate::providers::ValertService;
use anyhow::Result;
use comfy_table::Cell;

pub fn status_table(status: &ServerCacheStatus) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Valid"),
        Cell::new(if status.is_valid { "yes" } else { "no" }),
    ]);
    table.add_row(vec![
        Cell::new("Age"),
        ui::format_optional_cell(status.age_seconds, |s| format!("{s:.0}s")),
    ]);
    table.add_row(vec![
        Cell::new("TTL"),
        ui::format_optional_cell(status.ttl_seconds, |s| format!("{s}s")),
    ]);
    table.add_row(vec![Cell::new("Rates"), Cell::new(status.rates_count)]);
    table.add_row(vec![
        Cell::new("Last update"),
        Cell::new(status.last_update.as_deref().unwrap_or("-")),
    ]);
    table.to_string()
}

pub async fn status(service: &ValertService) -> Result<()> {
    let Some(status) = service.server_cache_status().await else {
        anyhow::bail!("Server cache status is unavailable");
    };
    println!(
        "{}\n\n{}",
        ui::style_text("Server cache", ui::StyleType::Title),
        status_table(&status)
    );
    Ok(())
}

pub async fn refresh(service: &ValertService) -> Result<()> {
    if !service.refresh_server_cache().await {
        anyhow::bail!("Server cache refresh failed");
    }
    println!("Server cache refreshed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let status = ServerCacheStatus {
            is_valid: true,
            age_seconds: Some(42.4),
            ttl_seconds: Some(300),
            rates_count: 75,
            last_update: None,
        };
        let output = status_table(&status);
        assert!(output.contains("42s"));
        assert!(output.contains("300s"));
        assert!(output.contains("75"));
    }
}
