//! Indicator engine — causal, no look-ahead.
//!
//! Each indicator returns one value per input candle, with `f64::NAN` marking
//! the warmup region where not enough history exists yet. The snapshot layer
//! ([`snapshot::annotate`]) is the only consumer and replaces warmup NaN with
//! the neutral defaults (RSI 50, ATR/volume-MA/ADX 0) so that callers never
//! see an error for short history.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod snapshot;

pub use adx::adx;
pub use atr::{atr, true_range};
pub use ema::ema;
pub use rsi::rsi;
pub use sma::sma;
pub use snapshot::{annotate, IndicatorConfig, IndicatorSnapshot};

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for the first
/// candle), high = max(open, close) + 1.0, low = min(open, close) - 1.0,
/// volume = 1000. Timestamps ascend in one-minute steps.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
