//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single instrument over a single interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Basic OHLCV sanity check: finite fields, high >= low, body inside range,
    /// non-negative volume.
    pub fn is_sane(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite();
        finite
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    /// True when the candle closed above its open.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    /// True when the candle closed below its open. A doji is neither green
    /// nor red and confirms no direction.
    pub fn is_red(&self) -> bool {
        self.close < self.open
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }
}

/// Structured validation errors for candle series construction.
#[derive(Debug, Error)]
pub enum CandleError {
    #[error("candle series is empty")]
    Empty,

    #[error("candle {index} is not sane (non-finite field or inverted range)")]
    InsaneCandle { index: usize },

    #[error("candle {index} is not time-ascending (timestamp {timestamp})")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("candle {index} duplicates timestamp {timestamp}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Validated, strictly time-ascending candle series with no duplicate
/// timestamps. The only way to construct one is through [`CandleSeries::new`],
/// so downstream code can rely on ordering without re-checking.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self, CandleError> {
        if candles.is_empty() {
            return Err(CandleError::Empty);
        }
        for (index, candle) in candles.iter().enumerate() {
            if !candle.is_sane() {
                return Err(CandleError::InsaneCandle { index });
            }
            if index > 0 {
                let prev = candles[index - 1].timestamp;
                if candle.timestamp == prev {
                    return Err(CandleError::DuplicateTimestamp {
                        index,
                        timestamp: candle.timestamp,
                    });
                }
                if candle.timestamp < prev {
                    return Err(CandleError::OutOfOrder {
                        index,
                        timestamp: candle.timestamp,
                    });
                }
            }
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// The most recent candle. The series is never empty.
    pub fn last(&self) -> &Candle {
        self.candles.last().expect("series is never empty")
    }

    /// The candle before the most recent one, if any.
    pub fn prev(&self) -> Option<&Candle> {
        let n = self.candles.len();
        if n >= 2 {
            Some(&self.candles[n - 2])
        } else {
            None
        }
    }

    /// Lowest low over the last `n` candles (clamped to series length).
    pub fn lowest_low(&self, n: usize) -> f64 {
        let start = self.candles.len().saturating_sub(n);
        self.candles[start..]
            .iter()
            .map(|c| c.low)
            .fold(f64::INFINITY, f64::min)
    }

    /// Highest high over the last `n` candles (clamped to series length).
    pub fn highest_high(&self, n: usize) -> f64 {
        let start = self.candles.len().saturating_sub(n);
        self.candles[start..]
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
