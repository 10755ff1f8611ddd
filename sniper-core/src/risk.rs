//! Risk engine — stop-loss and take-profit from structural extremes.
//!
//! Long:  stop = lowest low(N) - k*ATR;  risk = entry - stop;  target = entry + R*risk
//! Short: stop = highest high(N) + k*ATR; risk = stop - entry; target = entry - R*risk
//!
//! If the recent extremes have collapsed onto the entry (risk <= 0), the plan
//! is reported as invalid rather than emitting a zero or inverted target;
//! callers treat that signal as not actionable.

use crate::domain::{CandleSeries, Direction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Risk parameters: swing lookback N, ATR buffer multiplier k, reward:risk R.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    pub swing_lookback: usize,
    pub atr_buffer: f64,
    pub reward_ratio: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            swing_lookback: 10,
            atr_buffer: 0.2,
            reward_ratio: 2.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RiskError {
    #[error("invalid levels: stop {stop} leaves no risk distance from entry {entry}")]
    InvalidLevels { entry: f64, stop: f64 },
}

/// Stop/target pair for a directional signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Derive stop-loss and take-profit for an entry at the latest price.
pub fn plan(
    direction: Direction,
    entry: f64,
    atr: f64,
    series: &CandleSeries,
    cfg: &RiskConfig,
) -> Result<TradeLevels, RiskError> {
    let (stop, risk) = match direction {
        Direction::Long => {
            let stop = series.lowest_low(cfg.swing_lookback) - cfg.atr_buffer * atr;
            (stop, entry - stop)
        }
        Direction::Short => {
            let stop = series.highest_high(cfg.swing_lookback) + cfg.atr_buffer * atr;
            (stop, stop - entry)
        }
    };

    if risk <= 0.0 {
        return Err(RiskError::InvalidLevels { entry, stop });
    }

    let take_profit = match direction {
        Direction::Long => entry + risk * cfg.reward_ratio,
        Direction::Short => entry - risk * cfg.reward_ratio,
    };

    Ok(TradeLevels {
        stop_loss: stop,
        take_profit,
    })
}
