pub mod cli;
pub mod core;
pub mod providers;
pub mod server;

use crate::cli::rates::RateView;
use crate::core::Timeframe;
use crate::core::config::AppConfig;
use crate::server::AppState;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Serve {
        bind: Option<String>,
    },
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    Rates {
        search: Option<String>,
        movers: bool,
        favorites: Vec<String>,
    },
    News {
        query: Option<String>,
        category: Option<String>,
        impact: Option<String>,
    },
    Chart {
        pair: String,
        timeframe: Timeframe,
        candles: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxdesk starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        bind = %config.server.bind,
        cache_ttl_secs = config.cache_ttl_secs,
        retries = config.retries,
        "Loaded config"
    );

    let state = || AppState::from_config(&config);
    match command {
        AppCommand::Serve { bind } => server::serve(&config, bind.as_deref()).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(state()?.rates.as_ref(), amount, &from, &to).await
        }
        AppCommand::Rates {
            search,
            movers,
            favorites,
        } => {
            let view = RateView {
                search,
                movers,
                favorites,
            };
            cli::rates::run(state()?.rates.as_ref(), &view).await
        }
        AppCommand::News {
            query,
            category,
            impact,
        } => {
            cli::news::run(
                state()?.news.as_ref(),
                query.as_deref(),
                category.as_deref(),
                impact.as_deref(),
            )
            .await
        }
        AppCommand::Chart {
            pair,
            timeframe,
            candles,
        } => {
            let state = state()?;
            cli::chart::run(
                state.rates.as_ref(),
                state.quotes.as_ref(),
                &pair,
                timeframe,
                candles,
            )
            .await
        }
    }
}
