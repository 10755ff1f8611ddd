//! Domain types for the sniper engine.

pub mod account;
pub mod candle;
pub mod signal;
pub mod trade;

pub use account::Account;
pub use candle::{Candle, CandleError, CandleSeries};
pub use signal::{Signal, Trend, Verdict};
pub use trade::{Direction, Trade, TradeStatus};
