//! Trade — a simulated position from open to terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Lifecycle state: Open transitions exactly once to Win or Loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    Win,
    Loss,
}

impl TradeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Open)
    }
}

/// A simulated trade. Close fields are `None` while the trade is open and are
/// stamped exactly once when price crosses the stop or target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
    pub status: TradeStatus,
    pub close_price: Option<f64>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Realized profit/loss in percent of entry, signed.
    pub pnl_pct: Option<f64>,
    /// Account balance after this trade settled.
    pub balance_after: Option<f64>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Signed percent move from entry to `price`, adjusted for direction.
    pub fn pnl_pct_at(&self, price: f64) -> f64 {
        let raw = (price - self.entry) / self.entry * 100.0;
        match self.direction {
            Direction::Long => raw,
            Direction::Short => -raw,
        }
    }
}
