pub mod cli;
pub mod core;
pub mod providers;

use crate::core::alert::Direction;
use crate::core::analytics::Side;
use crate::core::config::AppConfig;
use crate::providers::ValertService;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AlertCommand {
    List,
    Add {
        currency: String,
        direction: Direction,
        threshold: f64,
    },
    Remove {
        id: u64,
    },
    Check,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Rates {
        force_refresh: bool,
        popular_only: bool,
    },
    Rate {
        currency: String,
    },
    History {
        currencies: Vec<String>,
        days: u32,
    },
    Convert {
        amount: f64,
        currency: String,
        bank: Option<String>,
        side: Side,
    },
    Portfolio,
    Alerts(AlertCommand),
    CacheStatus,
    CacheRefresh,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("VAlert starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = ValertService::from_config(&config)?;

    match command {
        AppCommand::Rates {
            force_refresh,
            popular_only,
        } => cli::rates::run(&service, force_refresh, popular_only).await,
        AppCommand::Rate { currency } => cli::rates::run_single(&service, &currency).await,
        AppCommand::History { currencies, days } => {
            cli::history::run(&service, &currencies, days).await
        }
        AppCommand::Convert {
            amount,
            currency,
            bank,
            side,
        } => {
            cli::convert::run(
                &service,
                &config.banks,
                amount,
                &currency,
                bank.as_deref(),
                side,
            )
            .await
        }
        AppCommand::Portfolio => cli::portfolio::run(&service, &config.portfolio).await,
        AppCommand::Alerts(AlertCommand::List) => cli::alerts::list(&service).await,
        AppCommand::Alerts(AlertCommand::Add {
            currency,
            direction,
            threshold,
        }) => cli::alerts::add(&service, &currency, direction, threshold).await,
        AppCommand::Alerts(AlertCommand::Remove { id }) => cli::alerts::remove(&service, id).await,
        AppCommand::Alerts(AlertCommand::Check) => cli::alerts::check(&service).await,
        AppCommand::CacheStatus => cli::cache::status(&service).await,
        AppCommand::CacheRefresh => cli::cache::refresh(&service).await,
    }
}
