pub mod parse;
pub mod yahoo_finance;

pub use yahoo_finance::{YahooConfig, YahooFinanceClient};
