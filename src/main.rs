use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxdesk::cli::setup::setup;
use fxdesk::core::Timeframe;
use fxdesk::core::log::{init_logging, level_for};

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
    /// Run the JSON API
    Serve {
        /// Address to listen on, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Convert an amount at the current rate
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    /// Show the exchange rate board against USD
    Rates {
        /// Filter by currency code or name
        #[arg(short, long)]
        search: Option<String>,
        /// Sort by absolute change, largest first
        #[arg(short, long)]
        movers: bool,
        /// Only show these currency codes
        #[arg(short, long, value_delimiter = ',')]
        favorites: Vec<String>,
    },
    /// Show currency market news
    News {
        /// Search term
        #[arg(short, long)]
        query: Option<String>,
        /// News category, e.g. "Central Banks"
        #[arg(long)]
        category: Option<String>,
        /// high, medium, low or all
        #[arg(short, long)]
        impact: Option<String>,
    },
    /// Show rate history for a FROM/TO pair
    Chart {
        pair: String,
        /// 1D, 7D, 1M, 3M or 1Y
        #[arg(short, long, default_value = "7D")]
        timeframe: String,
        /// Show OHLC candles instead of the daily rate line
        #[arg(long)]
        candles: bool,
    },
}

impl From<Commands> for fxdesk::AppCommand {
    fn from(cmd: Commands) -> fxdesk::AppCommand {
        match cmd {
            Commands::Serve { bind } => fxdesk::AppCommand::Serve { bind },
            Commands::Convert { amount, from, to } => {
                fxdesk::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates {
                search,
                movers,
                favorites,
            } => fxdesk::AppCommand::Rates {
                search,
                movers,
                favorites,
            },
            Commands::News {
                query,
                category,
                impact,
            } => fxdesk::AppCommand::News {
                query,
                category,
                impact,
            },
            Commands::Chart {
                pair,
                timeframe,
                candles,
            } => fxdesk::AppCommand::Chart {
                pair,
                timeframe: Timeframe::parse_or_default(&timeframe),
                candles,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Some(Commands::Serve { .. }));
    init_logging(level_for(cli.verbose, serving));

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fxdesk::cli::setup::setup_at_path(path),
            None => setup(),
        },
        Some(cmd) => fxdesk::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
