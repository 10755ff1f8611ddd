//! Signal evaluation — ordered rule tiers over indicator snapshots.

pub mod evaluator;

pub use evaluator::evaluate;

use serde::{Deserialize, Serialize};

/// Thresholds for the rule tiers. The tier ORDER is structural and lives in
/// the evaluator; everything here is tunable configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalConfig {
    /// Minimum series length before any tier may fire.
    pub min_candles: usize,
    /// Market-active gate: ADX must be at or above this floor. None disables
    /// the gate.
    pub adx_floor: Option<f64>,
    /// Require volume above its moving average for volume-confirmed tiers.
    pub require_volume: bool,
    /// Tier 1: RSI at or beyond these bounds is an extreme-momentum override.
    pub rsi_extreme_low: f64,
    pub rsi_extreme_high: f64,
    /// Tier 2: trend-aligned pullback thresholds.
    pub rsi_pullback_long: f64,
    pub rsi_pullback_short: f64,
    /// Tier 2: candle body must be at least this fraction of ATR.
    pub body_atr_ratio: f64,
    /// Tier 3: edges of the extreme zone that a reversal must cross back from.
    pub rsi_reversal_low: f64,
    pub rsi_reversal_high: f64,
    /// Tiers 3 and 6: the neutral middle band.
    pub rsi_middle_low: f64,
    pub rsi_middle_high: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_candles: 50,
            adx_floor: Some(20.0),
            require_volume: true,
            rsi_extreme_low: 20.0,
            rsi_extreme_high: 80.0,
            rsi_pullback_long: 45.0,
            rsi_pullback_short: 55.0,
            body_atr_ratio: 0.5,
            rsi_reversal_low: 30.0,
            rsi_reversal_high: 70.0,
            rsi_middle_low: 45.0,
            rsi_middle_high: 55.0,
        }
    }
}
