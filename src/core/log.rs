use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: LevelFilter) {
    let app_filter = Targets::new()
        .with_target("fxdesk", level)
        .with_target("tower_http", level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}

/// Picks the level for a run: verbose is debug, the server is info, the rest is quiet.
pub fn level_for(verbose: bool, serving: bool) -> LevelFilter {
    match (verbose, serving) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::INFO,
        (false, false) => LevelFilter::OFF,
    }
}
