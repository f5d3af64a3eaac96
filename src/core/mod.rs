//! Core business logic abstractions

pub mod cache;
pub mod charts;
pub mod config;
pub mod currency;
pub mod insights;
pub mod log;
pub mod market;
pub mod news;
pub mod rates;

// Re-export main types for cleaner imports
pub use currency::CurrencyRateProvider;
pub use market::{ExchangeRateProvider, NewsProvider, QuoteProvider, Timeframe};
