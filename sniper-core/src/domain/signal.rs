//! Signal — the immutable outcome of one evaluation pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional verdict of the signal evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Long,
    Short,
    Neutral,
}

impl Verdict {
    pub fn is_directional(&self) -> bool {
        !matches!(self, Verdict::Neutral)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Long => write!(f, "LONG"),
            Verdict::Short => write!(f, "SHORT"),
            Verdict::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Market regime relative to the trend EMA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "BULLISH"),
            Trend::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// Signal value object. Produced fresh on every evaluation, never mutated.
///
/// For a Neutral verdict, strength is 0 and the price levels are 0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub verdict: Verdict,
    /// Internally computed strength, 0-100.
    pub strength: u8,
    /// Human-readable explanation of which rule tier fired (or why none did).
    pub rationale: String,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Signal {
    /// A neutral signal with the given rationale and the latest price for context.
    pub fn neutral(rationale: impl Into<String>, entry: f64) -> Self {
        Self {
            verdict: Verdict::Neutral,
            strength: 0,
            rationale: rationale.into(),
            entry,
            stop_loss: 0.0,
            take_profit: 0.0,
        }
    }
}
