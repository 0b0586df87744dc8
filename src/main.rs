use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use valert::core::alert::Direction;
use valert::core::analytics::Side;
use valert::core::log::init_logging;
use valert::providers::api::DEFAULT_HISTORY_DAYS;
use valert::{AlertCommand, AppCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display current exchange rates
    Rates {
        /// Skip the local cache and fetch from the API
        #[arg(short, long)]
        force: bool,
        /// Only show the most traded currencies
        #[arg(short, long)]
        popular: bool,
    },
    /// Display the rate of a single currency
    Rate { currency: String },
    /// Display historical rates
    History {
        #[arg(required = true)]
        currencies: Vec<String>,
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: u32,
    },
    /// Convert an amount of foreign currency using bank rates
    Convert {
        amount: f64,
        currency: String,
        /// Bank code from the config; compares all banks when omitted
        #[arg(short, long)]
        bank: Option<String>,
        /// Sell the foreign currency instead of buying it
        #[arg(short, long)]
        sell: bool,
    },
    /// Display portfolio value and profit
    Portfolio,
    /// Manage rate alerts
    #[command(subcommand)]
    Alerts(AlertsCommands),
    /// Inspect or refresh the server-side rate cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
enum AlertsCommands {
    /// List alerts
    List,
    /// Create an alert
    Add {
        currency: String,
        /// above or below
        direction: Direction,
        threshold: f64,
    },
    /// Delete an alert
    Rm { id: u64 },
    /// Show alerts triggered by current rates
    Check,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show server cache status
    Status,
    /// Force the server to refresh rates
    Refresh,
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Rates { force, popular } => AppCommand::Rates {
                force_refresh: force,
                popular_only: popular,
            },
            Commands::Rate { currency } => AppCommand::Rate { currency },
            Commands::History { currencies, days } => AppCommand::History { currencies, days },
            Commands::Convert {
                amount,
                currency,
                bank,
                sell,
            } => AppCommand::Convert {
                amount,
                currency,
                bank,
                side: if sell { Side::Sell } else { Side::Buy },
            },
            Commands::Portfolio => AppCommand::Portfolio,
            Commands::Alerts(AlertsCommands::List) => AppCommand::Alerts(AlertCommand::List),
            Commands::Alerts(AlertsCommands::Add {
                currency,
                direction,
                threshold,
            }) => AppCommand::Alerts(AlertCommand::Add {
                currency,
                direction,
                threshold,
            }),
            Commands::Alerts(AlertsCommands::Rm { id }) => {
                AppCommand::Alerts(AlertCommand::Remove { id })
            }
            Commands::Alerts(AlertsCommands::Check) => AppCommand::Alerts(AlertCommand::Check),
            Commands::Cache(CacheCommands::Status) => AppCommand::CacheStatus,
            Commands::Cache(CacheCommands::Refresh) => AppCommand::CacheRefresh,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => valert::cli::setup::setup_at_path(path),
            None => valert::cli::setup::setup(),
        },
        Some(cmd) => valert::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
