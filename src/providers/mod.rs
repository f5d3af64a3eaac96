pub mod alpha_vantage;
pub mod caching;
pub mod exchange_rate;
pub mod news_api;
pub mod util;
