//! Stats aggregator — pure reducer over closed-trade history.

use crate::domain::{Account, Trade, TradeStatus};
use serde::{Deserialize, Serialize};

/// Aggregate performance over all closed trades.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsReport {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    /// wins / total * 100
    pub win_rate: f64,
    /// Sum of per-trade P&L percentages, signed.
    pub total_pnl_pct: f64,
    pub balance: f64,
    /// Percent growth of the balance since the starting value.
    pub growth_pct: f64,
}

impl StatsReport {
    /// Compute the report. Returns None for an empty history rather than
    /// dividing by zero.
    pub fn from_history(history: &[Trade], account: &Account) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let wins = history
            .iter()
            .filter(|t| t.status == TradeStatus::Win)
            .count();
        let losses = history
            .iter()
            .filter(|t| t.status == TradeStatus::Loss)
            .count();
        let total = history.len();
        let total_pnl_pct: f64 = history.iter().filter_map(|t| t.pnl_pct).sum();

        Some(Self {
            total,
            wins,
            losses,
            win_rate: wins as f64 / total as f64 * 100.0,
            total_pnl_pct,
            balance: account.balance(),
            growth_pct: account.growth_pct(),
        })
    }
}
