pub mod chart;
pub mod convert;
pub mod news;
pub mod rates;
pub mod setup;
pub mod ui;
